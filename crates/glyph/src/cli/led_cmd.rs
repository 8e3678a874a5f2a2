//! `led` subcommand — light one LED of the array.

use std::path::Path;

use glyph_lib::led::Brightness;
use glyph_lib::state::DesiredState;

use super::{AppContext, GlyphError, Result};

pub(super) fn cmd_led(index: u32, level: Option<i64>, config_path: Option<&Path>) -> Result<()> {
    let ctx = AppContext::open(config_path)?;
    let level = match level {
        Some(l) => Brightness::clamped(l),
        None => {
            let state = DesiredState::capture(&ctx.store);
            if !state.master_enabled {
                return Err(GlyphError::Settings(
                    "glyph is off; pass a level explicitly".into(),
                ));
            }
            state.brightness
        }
    };
    ctx.led.light_single(index, level)?;
    println!(
        "LED {index} -> level {level} ({})",
        ctx.led.hardware_value(level)
    );
    Ok(())
}
