//! Desired light state — a snapshot of the settings taken for one reconciliation.

use serde::Serialize;

use crate::led::Brightness;
use crate::service::ServiceKind;
use crate::settings::{SettingsStore, keys};

/// Read-only snapshot of the settings that drive the services.
///
/// Captured fresh for every reconciliation and discarded afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DesiredState {
    pub master_enabled: bool,
    pub charging_enabled: bool,
    pub call_enabled: bool,
    pub notifs_enabled: bool,
    pub flip_enabled: bool,
    #[serde(serialize_with = "serialize_brightness")]
    pub brightness: Brightness,
}

fn serialize_brightness<S: serde::Serializer>(b: &Brightness, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(b.get())
}

impl DesiredState {
    /// State with the master switch off. Individual flags are left false.
    pub fn disabled() -> Self {
        DesiredState {
            master_enabled: false,
            charging_enabled: false,
            call_enabled: false,
            notifs_enabled: false,
            flip_enabled: false,
            brightness: Brightness::default(),
        }
    }

    /// Read the current settings.
    ///
    /// When the master switch is off nothing else is read: the individual
    /// flags and brightness need not be valid in that case.
    pub fn capture(store: &(impl SettingsStore + ?Sized)) -> Self {
        if !store.get_bool(keys::GLYPH_ENABLE, keys::DEFAULT_GLYPH_ENABLE) {
            return Self::disabled();
        }
        DesiredState {
            master_enabled: true,
            charging_enabled: store.get_bool(
                keys::GLYPH_CHARGING_LEVEL_ENABLE,
                keys::DEFAULT_CHARGING_LEVEL_ENABLE,
            ),
            call_enabled: store.get_bool(keys::GLYPH_CALL_ENABLE, keys::DEFAULT_CALL_ENABLE),
            notifs_enabled: store.get_bool(keys::GLYPH_NOTIFS_ENABLE, keys::DEFAULT_NOTIFS_ENABLE),
            flip_enabled: store.get_bool(keys::GLYPH_FLIP_ENABLE, keys::DEFAULT_FLIP_ENABLE),
            brightness: Brightness::clamped(
                store.get_int_or(keys::GLYPH_BRIGHTNESS, Brightness::DEFAULT.get().into()),
            ),
        }
    }

    /// The service's own toggle, ignoring the master switch.
    pub fn flag(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::Charging => self.charging_enabled,
            ServiceKind::Call => self.call_enabled,
            ServiceKind::Notifications => self.notifs_enabled,
            ServiceKind::FlipToGlyph => self.flip_enabled,
        }
    }

    /// Whether the service should be running: master on and its own flag on.
    pub fn wants_running(&self, kind: ServiceKind) -> bool {
        self.master_enabled && self.flag(kind)
    }
}
