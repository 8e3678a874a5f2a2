//! Service reconciliation — drive the four light services and the LED
//! brightness to match the current settings.
//!
//! [`plan`] is a pure mapping from a [`DesiredState`] to actions; [`apply`]
//! executes a plan against the service handles and LED writer. Every call
//! re-derives the full state, so calling it again with unchanged settings is
//! harmless: the handles absorb redundant starts and stops.

use serde::Serialize;

use crate::led::{self, Brightness, LedWriter};
use crate::service::{ServiceAction, ServiceKind, ServiceSet};
use crate::settings::SettingsStore;
use crate::state::DesiredState;

/// Actions derived from one [`DesiredState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    pub charging: ServiceAction,
    pub call: ServiceAction,
    pub notifications: ServiceAction,
    pub flip: ServiceAction,
    /// Level to write; `None` when the master switch is off.
    #[serde(serialize_with = "serialize_level")]
    pub brightness: Option<Brightness>,
}

fn serialize_level<S: serde::Serializer>(
    b: &Option<Brightness>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match b {
        Some(level) => s.serialize_some(&level.get()),
        None => s.serialize_none(),
    }
}

impl ReconcilePlan {
    pub fn action(&self, kind: ServiceKind) -> ServiceAction {
        match kind {
            ServiceKind::Charging => self.charging,
            ServiceKind::Call => self.call,
            ServiceKind::Notifications => self.notifications,
            ServiceKind::FlipToGlyph => self.flip,
        }
    }

    /// `(kind, action)` pairs in reconciliation order.
    pub fn actions(&self) -> impl Iterator<Item = (ServiceKind, ServiceAction)> + '_ {
        ServiceKind::ALL.into_iter().map(|k| (k, self.action(k)))
    }
}

/// Compute the actions for `state`.
pub fn plan(state: &DesiredState) -> ReconcilePlan {
    if !state.master_enabled {
        return ReconcilePlan {
            charging: ServiceAction::Stop,
            call: ServiceAction::Stop,
            notifications: ServiceAction::Stop,
            flip: ServiceAction::Stop,
            brightness: None,
        };
    }
    let action = |k| ServiceAction::from_running(state.wants_running(k));
    ReconcilePlan {
        charging: action(ServiceKind::Charging),
        call: action(ServiceKind::Call),
        notifications: action(ServiceKind::Notifications),
        flip: action(ServiceKind::FlipToGlyph),
        brightness: Some(state.brightness),
    }
}

/// Execute `plan`: brightness first, then each service in order.
///
/// Failures are logged and skipped; the next reconciliation retries
/// implicitly by re-deriving the whole state.
pub fn apply(plan: &ReconcilePlan, services: &ServiceSet, led: &dyn LedWriter) {
    if let Some(level) = plan.brightness
        && let Err(e) = led.set_brightness(level)
    {
        led::log_led_error(&e);
    }
    for (kind, action) in plan.actions() {
        log::debug!("{action} glyph {kind} service");
        if let Err(e) = services.get(kind).apply(action) {
            log::warn!("{e}");
        }
    }
}

/// Reconcile the services against `state`. Returns the plan that was applied.
pub fn reconcile(state: &DesiredState, services: &ServiceSet, led: &dyn LedWriter) -> ReconcilePlan {
    let plan = plan(state);
    apply(&plan, services, led);
    plan
}

/// Capture the current settings and reconcile against them.
pub fn reconcile_store(
    store: &dyn SettingsStore,
    services: &ServiceSet,
    led: &dyn LedWriter,
) -> ReconcilePlan {
    reconcile(&DesiredState::capture(store), services, led)
}
