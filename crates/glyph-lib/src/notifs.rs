//! Per-app notification toggles — which installed apps get a switch, and
//! whether each one lights the glyph.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GlyphError, Result};
use crate::settings::{SettingsStore, keys};

/// Packages that never get a per-app switch.
pub const APPS_TO_IGNORE: &[&str] = &[
    "com.derp.glyph",
    "com.android.settings",
    "com.android.systemui",
    "com.android.dialer",
    "com.google.android.dialer",
];

/// An installed application as reported by the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub package_name: String,
    /// Display label. Falls back to the package name when empty.
    #[serde(default)]
    pub label: String,
    /// Whether the app has a launcher entry.
    #[serde(default = "default_true")]
    pub launchable: bool,
}

fn default_true() -> bool {
    true
}

impl AppInfo {
    pub fn display_name(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.package_name
        } else {
            &self.label
        }
    }
}

/// Apps that get a per-app switch: launchable and not ignored, sorted by
/// display name (case-insensitive), ties broken by package name.
pub fn notification_apps(apps: &[AppInfo], ignore: &[&str]) -> Vec<AppInfo> {
    let mut selected: Vec<AppInfo> = apps
        .iter()
        .filter(|a| a.launchable && !ignore.contains(&a.package_name.as_str()))
        .cloned()
        .collect();
    selected.sort_by(|a, b| {
        a.display_name()
            .to_lowercase()
            .cmp(&b.display_name().to_lowercase())
            .then_with(|| a.package_name.cmp(&b.package_name))
    });
    selected
}

/// Load an app list from a JSON array of [`AppInfo`].
pub fn load_apps(path: &Path) -> Result<Vec<AppInfo>> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| GlyphError::Settings(format!("invalid app list {}: {e}", path.display())))
}

/// Whether notifications from `package` light the glyph. Defaults to true.
pub fn is_app_enabled(store: &(impl SettingsStore + ?Sized), package: &str) -> bool {
    store.get_bool(package, keys::DEFAULT_APP_ENABLE)
}

pub fn set_app_enabled(
    store: &(impl SettingsStore + ?Sized),
    package: &str,
    enabled: bool,
) -> Result<()> {
    validate_package_name(package)?;
    store.put_bool(package, enabled)
}

/// One row of the per-app switch list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppToggle {
    pub package_name: String,
    pub label: String,
    pub enabled: bool,
}

/// The per-app switch list with current values.
pub fn app_toggles(
    store: &(impl SettingsStore + ?Sized),
    apps: &[AppInfo],
    ignore: &[&str],
) -> Vec<AppToggle> {
    notification_apps(apps, ignore)
        .into_iter()
        .map(|a| AppToggle {
            enabled: is_app_enabled(store, &a.package_name),
            label: a.display_name().to_string(),
            package_name: a.package_name,
        })
        .collect()
}

/// Package names are dotted identifiers; anything else would collide with
/// the light's own keys or be unusable as a settings key.
fn validate_package_name(package: &str) -> Result<()> {
    let valid_segment = |s: &str| {
        !s.is_empty()
            && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    if keys::ALL.contains(&package) || !package.contains('.') || !package.split('.').all(valid_segment)
    {
        return Err(GlyphError::Settings(format!(
            "not a package name: \"{package}\""
        )));
    }
    Ok(())
}
