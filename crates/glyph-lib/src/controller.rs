//! Settings controller — the toggles of the Glyph settings screens, each
//! write followed by a reconciliation.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{GlyphError, Result};
use crate::led::{Brightness, LedWriter};
use crate::notifs;
use crate::reconcile::{self, ReconcilePlan};
use crate::service::ServiceSet;
use crate::settings::{SettingsStore, keys};

/// A toggle that depends on the master switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Flip,
    Brightness,
    Notifications,
    Call,
    Charging,
}

impl Preference {
    /// Screen order.
    pub const ALL: [Preference; 5] = [
        Preference::Flip,
        Preference::Brightness,
        Preference::Notifications,
        Preference::Call,
        Preference::Charging,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Preference::Flip => keys::GLYPH_FLIP_ENABLE,
            Preference::Brightness => keys::GLYPH_BRIGHTNESS,
            Preference::Notifications => keys::GLYPH_NOTIFS_ENABLE,
            Preference::Call => keys::GLYPH_CALL_ENABLE,
            Preference::Charging => keys::GLYPH_CHARGING_LEVEL_ENABLE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preference::Flip => "flip",
            Preference::Brightness => "brightness",
            Preference::Notifications => "notifications",
            Preference::Call => "call",
            Preference::Charging => "charging",
        }
    }

    /// Value read when the key was never written.
    pub fn default_value(self) -> i64 {
        match self {
            Preference::Flip => keys::DEFAULT_FLIP_ENABLE.into(),
            Preference::Brightness => Brightness::DEFAULT.get().into(),
            Preference::Notifications => keys::DEFAULT_NOTIFS_ENABLE.into(),
            Preference::Call => keys::DEFAULT_CALL_ENABLE.into(),
            Preference::Charging => keys::DEFAULT_CHARGING_LEVEL_ENABLE.into(),
        }
    }

    pub fn is_switch(self) -> bool {
        self != Preference::Brightness
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preference {
    type Err = GlyphError;

    /// Accepts the short name (`flip`) or the settings key (`glyph_flip_enable`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Preference::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s) || p.key() == s)
            .ok_or_else(|| GlyphError::Settings(format!("unknown preference \"{s}\"")))
    }
}

/// Current value of a preference and whether it can be changed (the
/// dependent toggles are greyed out while the master switch is off).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceState {
    pub preference: Preference,
    pub key: &'static str,
    pub value: i64,
    pub enabled: bool,
}

/// Parse a switch value: `on/off`, `true/false`, `1/0`, `yes/no`.
pub fn parse_switch(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" | "enable" | "enabled" => Ok(true),
        "off" | "false" | "0" | "no" | "disable" | "disabled" => Ok(false),
        other => Err(GlyphError::Settings(format!(
            "expected on/off, got \"{other}\""
        ))),
    }
}

/// Bundles the store, the services and the LED writer the screens act on.
pub struct GlyphController<'a> {
    store: &'a dyn SettingsStore,
    services: &'a ServiceSet,
    led: &'a dyn LedWriter,
}

impl<'a> GlyphController<'a> {
    pub fn new(
        store: &'a dyn SettingsStore,
        services: &'a ServiceSet,
        led: &'a dyn LedWriter,
    ) -> Self {
        Self {
            store,
            services,
            led,
        }
    }

    pub fn master_enabled(&self) -> bool {
        self.store
            .get_bool(keys::GLYPH_ENABLE, keys::DEFAULT_GLYPH_ENABLE)
    }

    /// Main switch: store the value and reconcile.
    pub fn set_master(&self, enabled: bool) -> Result<ReconcilePlan> {
        self.store.put_bool(keys::GLYPH_ENABLE, enabled)?;
        Ok(self.reconcile())
    }

    /// Store a dependent preference and reconcile. Switch values are
    /// normalized to 0/1, brightness is clamped into its range.
    pub fn set_preference(&self, preference: Preference, value: i64) -> Result<ReconcilePlan> {
        if preference.is_switch() {
            self.store.put_bool(preference.key(), value != 0)?;
        } else {
            let level = Brightness::clamped(value);
            self.store.put_int(preference.key(), level.get().into())?;
        }
        Ok(self.reconcile())
    }

    /// Main switch of the notifications sub-screen.
    pub fn set_notifs_master(&self, enabled: bool) -> Result<ReconcilePlan> {
        self.set_preference(Preference::Notifications, enabled.into())
    }

    /// Per-app switch. Does not reconcile: the notification service reads
    /// these keys itself on every notification.
    pub fn set_app_enabled(&self, package: &str, enabled: bool) -> Result<()> {
        notifs::set_app_enabled(self.store, package, enabled)
    }

    pub fn is_app_enabled(&self, package: &str) -> bool {
        notifs::is_app_enabled(self.store, package)
    }

    pub fn reconcile(&self) -> ReconcilePlan {
        reconcile::reconcile_store(self.store, self.services, self.led)
    }

    pub fn preference_states(&self) -> Vec<PreferenceState> {
        let master = self.master_enabled();
        Preference::ALL
            .into_iter()
            .map(|p| {
                let raw = self.store.get_int_or(p.key(), p.default_value());
                let value = if p.is_switch() {
                    i64::from(raw != 0)
                } else {
                    Brightness::clamped(raw).get().into()
                };
                PreferenceState {
                    preference: p,
                    key: p.key(),
                    value,
                    enabled: master,
                }
            })
            .collect()
    }
}
