//! `enable` / `disable` / `brightness` / `get` / `set` subcommands.

use std::path::Path;

use glyph_lib::controller::parse_switch;
use glyph_lib::settings::keys;

use super::{
    AppContext, GlyphError, Preference, Result, SettingsStore, ValueOutput, on_off, print_json,
    reconcile_cmd::print_plan,
};

pub(super) fn cmd_master(enabled: bool, json: bool, config_path: Option<&Path>) -> Result<()> {
    let ctx = AppContext::open(config_path)?;
    let plan = ctx.controller().set_master(enabled)?;
    if !json {
        println!("Glyph: {}", on_off(enabled));
    }
    print_plan(&plan, json)
}

/// Parse `value` for `preference`: on/off for switches, an integer level
/// for brightness.
fn parse_value(preference: Preference, value: &str) -> Result<i64> {
    if preference.is_switch() {
        return parse_switch(value).map(i64::from);
    }
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| GlyphError::Settings(format!("expected a level 1-4, got \"{value}\"")))
}

pub(super) fn cmd_set(
    preference: Preference,
    value: &str,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let value = parse_value(preference, value)?;
    let ctx = AppContext::open(config_path)?;
    let ctl = ctx.controller();
    let plan = ctl.set_preference(preference, value)?;
    if !json {
        let stored = ctx.store.get_int_or(preference.key(), value);
        if preference.is_switch() {
            println!("{preference}: {}", on_off(stored != 0));
        } else {
            println!("{preference}: {stored}");
        }
        if !ctl.master_enabled() {
            println!("(glyph is off; change takes effect when enabled)");
        }
    }
    print_plan(&plan, json)
}

pub(super) fn cmd_get(key: &str, json: bool, config_path: Option<&Path>) -> Result<()> {
    let ctx = AppContext::open(config_path)?;
    let ctl = ctx.controller();

    let (key, value, is_switch) = if key == "enable" || key == keys::GLYPH_ENABLE {
        (keys::GLYPH_ENABLE.to_string(), i64::from(ctl.master_enabled()), true)
    } else if let Ok(preference) = key.parse::<Preference>() {
        let state = ctl
            .preference_states()
            .into_iter()
            .find(|s| s.preference == preference)
            .ok_or_else(|| GlyphError::Settings(format!("unknown preference \"{key}\"")))?;
        (state.key.to_string(), state.value, preference.is_switch())
    } else {
        // Anything else must be a package name with its own per-app switch.
        if !key.contains('.') {
            return Err(GlyphError::Settings(format!("unknown preference \"{key}\"")));
        }
        (key.to_string(), i64::from(ctl.is_app_enabled(key)), true)
    };

    if json {
        return print_json(&ValueOutput { key, value });
    }
    if is_switch {
        println!("{key}: {}", on_off(value != 0));
    } else {
        println!("{key}: {value}");
    }
    Ok(())
}
