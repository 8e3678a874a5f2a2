//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::led::SysfsLed;
use crate::service::ServiceKind;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# Glyph configuration — changes made outside the app may be overwritten.\n\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Settings store file. Empty = `settings.toml` next to this config.
    #[serde(default)]
    pub settings_path: String,

    /// JSON list of installed apps for the per-app switches. Empty = none.
    #[serde(default)]
    pub apps_path: String,

    /// How often `watch` checks the settings file for changes.
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,

    #[serde(default)]
    pub led: LedConfig,

    #[serde(default)]
    pub services: ServicesConfig,
}

/// LED device nodes and the brightness table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedConfig {
    /// Node receiving the hardware brightness value.
    #[serde(default = "default_brightness_path")]
    pub brightness_path: String,

    /// Node receiving `"<led-index> <value>"` lines.
    #[serde(default = "default_single_led_path")]
    pub single_led_path: String,

    /// Hardware value for brightness levels 1–4.
    #[serde(default = "default_brightness_levels")]
    pub brightness_levels: [u32; 4],
}

/// Start/stop commands for one service. Empty = no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceCommands {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub stop: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// A start/stop command running longer than this is killed.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default)]
    pub charging: ServiceCommands,
    #[serde(default)]
    pub call: ServiceCommands,
    #[serde(default)]
    pub notifications: ServiceCommands,
    #[serde(default)]
    pub flip: ServiceCommands,
}

fn default_watch_interval_ms() -> u64 {
    500
}
fn default_brightness_path() -> String {
    "/sys/class/leds/aw210xx_led/global_brightness".into()
}
fn default_single_led_path() -> String {
    "/sys/class/leds/aw210xx_led/single_led_br".into()
}
fn default_brightness_levels() -> [u32; 4] {
    [102, 1024, 2048, 4095]
}
fn default_command_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Config {
            settings_path: String::new(),
            apps_path: String::new(),
            watch_interval_ms: default_watch_interval_ms(),
            led: LedConfig::default(),
            services: ServicesConfig::default(),
        }
    }
}

impl Default for LedConfig {
    fn default() -> Self {
        LedConfig {
            brightness_path: default_brightness_path(),
            single_led_path: default_single_led_path(),
            brightness_levels: default_brightness_levels(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        ServicesConfig {
            command_timeout_secs: default_command_timeout_secs(),
            charging: ServiceCommands::default(),
            call: ServiceCommands::default(),
            notifications: ServiceCommands::default(),
            flip: ServiceCommands::default(),
        }
    }
}

impl ServicesConfig {
    pub fn commands(&self, kind: ServiceKind) -> &ServiceCommands {
        match kind {
            ServiceKind::Charging => &self.charging,
            ServiceKind::Call => &self.call,
            ServiceKind::Notifications => &self.notifications,
            ServiceKind::FlipToGlyph => &self.flip,
        }
    }
}

impl LedConfig {
    pub fn to_sysfs(&self) -> SysfsLed {
        SysfsLed::new(
            PathBuf::from(&self.brightness_path),
            PathBuf::from(&self.single_led_path),
            self.brightness_levels,
        )
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An LED node path is empty (`field` names the config key).
    EmptyLedPath { field: &'static str },
    /// The brightness table is not strictly increasing or contains zero.
    InvalidBrightnessLevels([u32; 4]),
    /// `watch_interval_ms` is zero.
    InvalidWatchInterval,
    /// `services.command_timeout_secs` is zero.
    InvalidCommandTimeout,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyLedPath { field } => write!(f, "led.{field} cannot be empty"),
            ValidationError::InvalidBrightnessLevels(levels) => write!(
                f,
                "led.brightness_levels must be non-zero and strictly increasing, got {levels:?}"
            ),
            ValidationError::InvalidWatchInterval => {
                write!(f, "watch_interval_ms must be greater than zero")
            }
            ValidationError::InvalidCommandTimeout => {
                write!(f, "services.command_timeout_secs must be greater than zero")
            }
        }
    }
}

/// Write `contents` to `path` atomically (write to temp file, then rename),
/// creating the parent directory.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, contents)?;
    match std::fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            // Rename can fail across filesystems; fall back to direct write + cleanup
            let result = std::fs::write(path, contents);
            let _ = std::fs::remove_file(&tmp);
            result
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glyph"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Settings store path: the configured one, or `settings.toml` beside
    /// the config file at `config_path` (platform default if `None`).
    pub fn resolve_settings_path(&self, config_path: Option<&Path>) -> Option<PathBuf> {
        if !self.settings_path.trim().is_empty() {
            return Some(PathBuf::from(self.settings_path.trim()));
        }
        match config_path {
            Some(p) => Some(
                p.parent()
                    .map(|d| d.join("settings.toml"))
                    .unwrap_or_else(|| PathBuf::from("settings.toml")),
            ),
            None => Self::dir().map(|d| d.join("settings.toml")),
        }
    }

    /// Save config to an arbitrary path atomically.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        write_atomic(path, &format!("{CONFIG_HEADER}{serialized}"))
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.led.brightness_path.trim().is_empty() {
            errors.push(ValidationError::EmptyLedPath {
                field: "brightness_path",
            });
        }
        if self.led.single_led_path.trim().is_empty() {
            errors.push(ValidationError::EmptyLedPath {
                field: "single_led_path",
            });
        }

        let levels = self.led.brightness_levels;
        if levels[0] == 0 || levels.windows(2).any(|w| w[0] >= w[1]) {
            errors.push(ValidationError::InvalidBrightnessLevels(levels));
        }

        if self.watch_interval_ms == 0 {
            errors.push(ValidationError::InvalidWatchInterval);
        }
        if self.services.command_timeout_secs == 0 {
            errors.push(ValidationError::InvalidCommandTimeout);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
