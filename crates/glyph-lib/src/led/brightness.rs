//! Brightness level of the light array.

use std::fmt;

/// Brightness level in `[Brightness::MIN, Brightness::MAX]`.
///
/// Always constructed by clamping, so a stored value outside the range
/// (hand-edited settings file, bad CLI input) maps to the nearest level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;
    pub const DEFAULT: Brightness = Brightness(3);

    /// Clamp an arbitrary integer into the valid level range.
    pub fn clamped(value: i64) -> Self {
        Brightness(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    /// The level as a plain integer (1–4).
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position of this level in a per-level lookup table.
    pub fn index(self) -> usize {
        (self.0 - Self::MIN) as usize
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
