//! Light services — the four independently startable units the reconciler drives.

use std::cell::Cell;
use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

/// Poll interval when waiting for a service command to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The four light services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Battery level shown while charging.
    Charging,
    /// Light pattern on incoming calls.
    Call,
    /// Light pattern on notifications.
    Notifications,
    /// Mute + light mode when the phone lies face down.
    #[serde(rename = "flip")]
    FlipToGlyph,
}

impl ServiceKind {
    /// All kinds in reconciliation order.
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Charging,
        ServiceKind::Call,
        ServiceKind::Notifications,
        ServiceKind::FlipToGlyph,
    ];

    /// Stable lowercase name used in logs, config and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Charging => "charging",
            ServiceKind::Call => "call",
            ServiceKind::Notifications => "notifications",
            ServiceKind::FlipToGlyph => "flip",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the reconciler wants a service to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
}

impl ServiceAction {
    pub fn from_running(running: bool) -> Self {
        if running {
            ServiceAction::Start
        } else {
            ServiceAction::Stop
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAction::Start => f.write_str("start"),
            ServiceAction::Stop => f.write_str("stop"),
        }
    }
}

/// Service control errors.
#[derive(Debug)]
pub enum ServiceError {
    /// The start/stop command could not be spawned or waited on.
    Spawn { service: String, source: io::Error },
    /// The command ran but reported failure.
    CommandFailed { service: String, reason: String },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Spawn { service, source } => {
                write!(f, "Could not run {service} service command: {source}")
            }
            ServiceError::CommandFailed { service, reason } => {
                write!(f, "{service} service command failed: {reason}")
            }
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Spawn { source, .. } => Some(source),
            ServiceError::CommandFailed { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// A controllable unit. Starting a running service or stopping a stopped
/// one must be a no-op.
pub trait ServiceHandle {
    fn start(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;

    fn apply(&self, action: ServiceAction) -> Result<()> {
        match action {
            ServiceAction::Start => self.start(),
            ServiceAction::Stop => self.stop(),
        }
    }
}

impl<T: ServiceHandle + ?Sized> ServiceHandle for Rc<T> {
    fn start(&self) -> Result<()> {
        (**self).start()
    }

    fn stop(&self) -> Result<()> {
        (**self).stop()
    }
}

// ── Shell command backend ──

/// Service controlled through shell commands (e.g. `systemctl start ...`,
/// `setprop ctl.start ...`).
///
/// The last known state is tracked so repeated starts/stops do not re-run the
/// command. The state is unknown until the first call, which always runs.
pub struct CommandService {
    kind: ServiceKind,
    start_command: String,
    stop_command: String,
    timeout: Duration,
    running: Cell<Option<bool>>,
}

impl CommandService {
    pub fn new(
        kind: ServiceKind,
        start_command: impl Into<String>,
        stop_command: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            kind,
            start_command: start_command.into(),
            stop_command: stop_command.into(),
            timeout,
            running: Cell::new(None),
        }
    }

    /// Last known state; `None` before the first start/stop.
    pub fn is_running(&self) -> Option<bool> {
        self.running.get()
    }

    fn transition(&self, want_running: bool) -> Result<()> {
        if self.running.get() == Some(want_running) {
            return Ok(());
        }
        let (verb, command) = if want_running {
            ("Starting", &self.start_command)
        } else {
            ("Stopping", &self.stop_command)
        };
        log::debug!("{verb} glyph {} service", self.kind);
        let command = command.trim();
        if !command.is_empty() {
            let status = run_command_with_timeout(command, self.timeout).map_err(|source| {
                ServiceError::Spawn {
                    service: self.kind.name().into(),
                    source,
                }
            })?;
            if !status.success() {
                return Err(ServiceError::CommandFailed {
                    service: self.kind.name().into(),
                    reason: format!("{status}: {command}"),
                });
            }
        }
        self.running.set(Some(want_running));
        Ok(())
    }
}

impl ServiceHandle for CommandService {
    fn start(&self) -> Result<()> {
        self.transition(true)
    }

    fn stop(&self) -> Result<()> {
        self.transition(false)
    }
}

/// Run a shell command with a timeout. Kills the process if it exceeds the deadline.
///
/// The command's stdout is discarded so it never mixes into CLI output;
/// stderr is inherited.
fn run_command_with_timeout(command: &str, timeout: Duration) -> io::Result<ExitStatus> {
    let mut cmd = if cfg!(windows) {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", command]);
        c
    } else {
        let mut c = std::process::Command::new("sh");
        c.args(["-c", command]);
        c
    };
    let mut child = cmd.stdout(Stdio::null()).spawn()?;

    let max_polls = (timeout.as_millis() / POLL_INTERVAL.as_millis()).max(1) as u64;
    for _ in 0..max_polls {
        match child.try_wait()? {
            Some(status) => return Ok(status),
            None => std::thread::sleep(POLL_INTERVAL),
        }
    }

    log::warn!("service command timed out after {timeout:?}, killing: {command}");
    let _ = child.kill();
    child.wait()
}

// ── Service set ──

/// One handle per [`ServiceKind`].
pub struct ServiceSet {
    charging: Box<dyn ServiceHandle>,
    call: Box<dyn ServiceHandle>,
    notifications: Box<dyn ServiceHandle>,
    flip: Box<dyn ServiceHandle>,
}

impl ServiceSet {
    pub fn new(
        charging: Box<dyn ServiceHandle>,
        call: Box<dyn ServiceHandle>,
        notifications: Box<dyn ServiceHandle>,
        flip: Box<dyn ServiceHandle>,
    ) -> Self {
        Self {
            charging,
            call,
            notifications,
            flip,
        }
    }

    /// Build command-backed handles from the `[services]` config table.
    pub fn from_config(config: &crate::config::ServicesConfig) -> Self {
        let timeout = Duration::from_secs(config.command_timeout_secs.max(1));
        let make = |kind: ServiceKind| -> Box<dyn ServiceHandle> {
            let cmds = config.commands(kind);
            Box::new(CommandService::new(
                kind,
                cmds.start.clone(),
                cmds.stop.clone(),
                timeout,
            ))
        };
        Self::new(
            make(ServiceKind::Charging),
            make(ServiceKind::Call),
            make(ServiceKind::Notifications),
            make(ServiceKind::FlipToGlyph),
        )
    }

    pub fn get(&self, kind: ServiceKind) -> &dyn ServiceHandle {
        match kind {
            ServiceKind::Charging => self.charging.as_ref(),
            ServiceKind::Call => self.call.as_ref(),
            ServiceKind::Notifications => self.notifications.as_ref(),
            ServiceKind::FlipToGlyph => self.flip.as_ref(),
        }
    }

    /// Stop every service, logging failures. Used on shutdown.
    pub fn stop_all(&self) {
        for kind in ServiceKind::ALL {
            if let Err(e) = self.get(kind).stop() {
                log::warn!("{e}");
            }
        }
    }
}

// ── Mock handles (for tests) ──

pub mod mock {
    use super::*;
    use std::cell::RefCell;

    /// Records every call and tracks a running flag. Redundant calls are
    /// recorded but do not change state.
    #[derive(Debug, Default)]
    pub struct RecordingService {
        pub calls: RefCell<Vec<ServiceAction>>,
        pub running: Cell<bool>,
        /// If true, `start`/`stop` return an error without changing state.
        pub fail: Cell<bool>,
    }

    impl RecordingService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_running(&self) -> bool {
            self.running.get()
        }

        pub fn last_call(&self) -> Option<ServiceAction> {
            self.calls.borrow().last().copied()
        }

        fn record(&self, action: ServiceAction) -> Result<()> {
            self.calls.borrow_mut().push(action);
            if self.fail.get() {
                return Err(ServiceError::CommandFailed {
                    service: "mock".into(),
                    reason: "injected failure".into(),
                });
            }
            self.running.set(action == ServiceAction::Start);
            Ok(())
        }
    }

    impl ServiceHandle for RecordingService {
        fn start(&self) -> Result<()> {
            self.record(ServiceAction::Start)
        }

        fn stop(&self) -> Result<()> {
            self.record(ServiceAction::Stop)
        }
    }

    /// Shared references to the handles inside a recording [`ServiceSet`].
    #[derive(Clone)]
    pub struct RecordingHandles {
        pub charging: Rc<RecordingService>,
        pub call: Rc<RecordingService>,
        pub notifications: Rc<RecordingService>,
        pub flip: Rc<RecordingService>,
    }

    impl RecordingHandles {
        pub fn get(&self, kind: ServiceKind) -> &RecordingService {
            match kind {
                ServiceKind::Charging => &self.charging,
                ServiceKind::Call => &self.call,
                ServiceKind::Notifications => &self.notifications,
                ServiceKind::FlipToGlyph => &self.flip,
            }
        }

        /// Running flags in [`ServiceKind::ALL`] order.
        pub fn running(&self) -> [bool; 4] {
            ServiceKind::ALL.map(|k| self.get(k).is_running())
        }
    }

    /// A [`ServiceSet`] of recording handles plus shared references to them.
    pub fn recording_set() -> (ServiceSet, RecordingHandles) {
        let handles = RecordingHandles {
            charging: Rc::new(RecordingService::new()),
            call: Rc::new(RecordingService::new()),
            notifications: Rc::new(RecordingService::new()),
            flip: Rc::new(RecordingService::new()),
        };
        let set = ServiceSet::new(
            Box::new(handles.charging.clone()),
            Box::new(handles.call.clone()),
            Box::new(handles.notifications.clone()),
            Box::new(handles.flip.clone()),
        );
        (set, handles)
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        let names: Vec<_> = ServiceKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["charging", "call", "notifications", "flip"]);
    }

    #[test]
    fn kind_serializes_as_name() {
        let json = serde_json::to_string(&ServiceKind::FlipToGlyph).unwrap();
        assert_eq!(json, "\"flip\"");
        let json = serde_json::to_string(&ServiceAction::Start).unwrap();
        assert_eq!(json, "\"start\"");
    }

    #[test]
    fn action_from_running() {
        assert_eq!(ServiceAction::from_running(true), ServiceAction::Start);
        assert_eq!(ServiceAction::from_running(false), ServiceAction::Stop);
    }

    #[test]
    fn recording_set_routes_by_kind() {
        let (set, handles) = recording_set();
        set.get(ServiceKind::Call).start().unwrap();
        assert!(handles.call.is_running());
        assert!(!handles.charging.is_running());
        assert_eq!(handles.running(), [false, true, false, false]);
    }

    #[test]
    fn stop_all_stops_every_service() {
        let (set, handles) = recording_set();
        for kind in ServiceKind::ALL {
            set.get(kind).start().unwrap();
        }
        set.stop_all();
        assert_eq!(handles.running(), [false; 4]);
    }

    #[test]
    fn stop_all_continues_after_failure() {
        let (set, handles) = recording_set();
        handles.charging.fail.set(true);
        set.stop_all();
        assert_eq!(handles.flip.last_call(), Some(ServiceAction::Stop));
    }

    #[test]
    fn command_service_empty_commands_track_state() {
        let svc = CommandService::new(ServiceKind::Charging, "", "  ", Duration::from_secs(1));
        assert_eq!(svc.is_running(), None);
        svc.start().unwrap();
        assert_eq!(svc.is_running(), Some(true));
        svc.stop().unwrap();
        assert_eq!(svc.is_running(), Some(false));
    }

    #[cfg(unix)]
    #[test]
    fn command_service_runs_command_once_per_transition() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log");
        let start = format!("echo start >> {}", log.display());
        let stop = format!("echo stop >> {}", log.display());
        let svc = CommandService::new(ServiceKind::Call, start, stop, Duration::from_secs(5));

        svc.start().unwrap();
        svc.start().unwrap();
        svc.stop().unwrap();
        svc.stop().unwrap();

        let contents = std::fs::read_to_string(&log).unwrap();
        assert_eq!(contents, "start\nstop\n");
    }

    #[cfg(unix)]
    #[test]
    fn command_service_failure_keeps_state_unknown() {
        let svc = CommandService::new(ServiceKind::Call, "false", "true", Duration::from_secs(5));
        let err = svc.start().unwrap_err();
        assert!(matches!(err, ServiceError::CommandFailed { .. }));
        assert_eq!(svc.is_running(), None);
    }

    #[cfg(unix)]
    #[test]
    fn run_command_with_timeout_kills_on_timeout() {
        let status = run_command_with_timeout("sleep 60", Duration::from_millis(200)).unwrap();
        assert!(!status.success());
    }
}
