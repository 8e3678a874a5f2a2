//! Unified error type for the glyph-lib crate.
//!
//! [`GlyphError`] wraps module-specific errors (`LedError`, `ServiceError`)
//! and domain-specific error kinds (`Settings`, `Config`).
//! `From` impls allow `?` to propagate across module boundaries.

use std::fmt;

use crate::led::LedError;
use crate::service::ServiceError;

/// Unified error type for glyph-lib operations.
#[derive(Debug)]
pub enum GlyphError {
    /// LED device file write failed.
    Led(LedError),
    /// Service start/stop failed.
    Service(ServiceError),
    /// Standard I/O error (settings and config persistence).
    Io(std::io::Error),
    /// Unknown preference key or unparseable setting value.
    Settings(String),
    /// Configuration validation error.
    Config(String),
}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphError::Led(e) => write!(f, "{e}"),
            GlyphError::Service(e) => write!(f, "{e}"),
            GlyphError::Io(e) => write!(f, "I/O error: {e}"),
            GlyphError::Settings(e) => write!(f, "Settings error: {e}"),
            GlyphError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for GlyphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlyphError::Led(e) => Some(e),
            GlyphError::Service(e) => Some(e),
            GlyphError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LedError> for GlyphError {
    fn from(e: LedError) -> Self {
        GlyphError::Led(e)
    }
}

impl From<ServiceError> for GlyphError {
    fn from(e: ServiceError) -> Self {
        GlyphError::Service(e)
    }
}

impl From<std::io::Error> for GlyphError {
    fn from(e: std::io::Error) -> Self {
        GlyphError::Io(e)
    }
}

/// Crate-level Result alias using [`GlyphError`].
pub type Result<T> = std::result::Result<T, GlyphError>;
