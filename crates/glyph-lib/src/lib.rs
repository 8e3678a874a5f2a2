//! Glyph — settings-driven control of the Glyph notification lights.

pub mod config;
pub mod controller;
pub mod error;
pub mod led;
pub mod notifs;
pub mod reconcile;
pub mod service;
pub mod settings;
pub mod state;
pub mod watcher;

pub use error::GlyphError;
