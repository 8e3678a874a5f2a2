//! CLI subcommands — settings toggles, reconciliation, watching.

mod apps;
mod config_cmd;
mod led_cmd;
mod reconcile_cmd;
mod set;
mod status;
mod watch;

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use glyph_lib::config::Config;
pub(super) use glyph_lib::controller::{GlyphController, Preference, PreferenceState};
pub(super) use glyph_lib::error::{GlyphError, Result};
pub(super) use glyph_lib::led::SysfsLed;
pub(super) use glyph_lib::reconcile::ReconcilePlan;
pub(super) use glyph_lib::service::ServiceSet;
pub(super) use glyph_lib::settings::{FileStore, SettingsStore};

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w.saturating_sub(2));
}

pub(super) fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| GlyphError::Io(std::io::Error::other(e)))?;
    println!("{json}");
    Ok(())
}

/// Load the config from `custom_path`, or the platform default.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    let (config, warnings) = match custom_path {
        Some(p) => Config::load_from(p),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("{w}");
    }
    config
}

/// Everything a command needs: config, settings store, services, LED.
pub(super) struct AppContext {
    pub config: Config,
    pub store: FileStore,
    pub services: ServiceSet,
    pub led: SysfsLed,
}

impl AppContext {
    pub fn open(custom_path: Option<&Path>) -> Result<Self> {
        let config = load_config(custom_path);
        if let Err(errors) = config.validate() {
            let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(GlyphError::Config(joined.join("; ")));
        }
        let config_path = custom_path.map(Path::to_path_buf).or_else(Config::path);
        let settings_path = config
            .resolve_settings_path(config_path.as_deref())
            .ok_or_else(|| GlyphError::Config("no config directory for settings".into()))?;
        let store = FileStore::open(settings_path)?;
        let services = ServiceSet::from_config(&config.services);
        let led = config.led.to_sysfs();
        Ok(Self {
            config,
            store,
            services,
            led,
        })
    }

    pub fn controller(&self) -> GlyphController<'_> {
        GlyphController::new(&self.store, &self.services, &self.led)
    }
}

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub version: String,
    pub settings_file: String,
    pub enabled: bool,
    pub preferences: Vec<PreferenceState>,
    pub plan: ReconcilePlan,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings_file: Option<String>,
    pub settings: Config,
    pub problems: Vec<String>,
}

#[derive(Serialize)]
pub(super) struct ValueOutput {
    pub key: String,
    pub value: i64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the master switch, preferences and the services that should run
    Status,

    /// Show current configuration and file paths
    Config {
        /// Write a config file with the defaults if none exists yet
        #[arg(long)]
        init: bool,
    },

    /// Turn the Glyph on and reconcile the services
    Enable,

    /// Turn the Glyph off and stop every service
    Disable,

    /// Set the brightness level (1-4)
    Brightness {
        /// Level; values outside 1-4 are clamped
        #[arg(allow_negative_numbers = true)]
        level: i64,
    },

    /// Read a preference (flip, brightness, notifications, call, charging),
    /// `enable`, or a package name
    Get {
        key: String,
    },

    /// Change a preference and reconcile
    Set {
        /// flip, brightness, notifications, call or charging
        preference: String,
        /// on/off for switches, 1-4 for brightness
        value: String,
    },

    /// List the per-app notification switches
    Apps {
        /// JSON app list (overrides `apps_path` from the config)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Turn notification lights on or off for one app
    App {
        /// Package name, e.g. com.example.chat
        package: String,
        /// on or off
        value: String,
    },

    /// Light a single LED at a brightness level
    Led {
        /// LED index on the array
        index: u32,
        /// Level 1-4 (default: current brightness setting)
        level: Option<i64>,
    },

    /// Reconcile the services against the current settings once
    Reconcile,

    /// Reconcile on every settings change until interrupted
    Watch,
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Status => status::cmd_status(json, config_path),
        Command::Config { init } => config_cmd::cmd_config(init, json, config_path),
        Command::Enable => set::cmd_master(true, json, config_path),
        Command::Disable => set::cmd_master(false, json, config_path),
        Command::Brightness { level } => {
            set::cmd_set(Preference::Brightness, &level.to_string(), json, config_path)
        }
        Command::Get { key } => set::cmd_get(&key, json, config_path),
        Command::Set { preference, value } => {
            let preference: Preference = preference.parse()?;
            set::cmd_set(preference, &value, json, config_path)
        }
        Command::Apps { file } => apps::cmd_apps(file.as_deref(), json, config_path),
        Command::App { package, value } => {
            if json {
                warn_json_unsupported("app");
            }
            apps::cmd_app(&package, &value, config_path)
        }
        Command::Led { index, level } => {
            if json {
                warn_json_unsupported("led");
            }
            led_cmd::cmd_led(index, level, config_path)
        }
        Command::Reconcile => reconcile_cmd::cmd_reconcile(json, config_path),
        Command::Watch => {
            if json {
                warn_json_unsupported("watch");
            }
            watch::cmd_watch(config_path)
        }
    }
}
