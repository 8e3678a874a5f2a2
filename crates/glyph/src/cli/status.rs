//! `status` subcommand — master switch, preferences and desired services.

use std::path::Path;

use glyph_lib::reconcile;
use glyph_lib::service::ServiceAction;
use glyph_lib::state::DesiredState;

use super::{AppContext, Result, StatusOutput, kv, kv_indent, kv_width, on_off, print_json};

pub(super) fn cmd_status(json: bool, config_path: Option<&Path>) -> Result<()> {
    let ctx = AppContext::open(config_path)?;
    let ctl = ctx.controller();
    let output = StatusOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        settings_file: ctx.store.path().display().to_string(),
        enabled: ctl.master_enabled(),
        preferences: ctl.preference_states(),
        plan: reconcile::plan(&DesiredState::capture(&ctx.store)),
    };

    if json {
        return print_json(&output);
    }

    let w = kv_width(
        &["Version:", "Settings:", "Glyph:"],
        &["notifications:", "brightness:"],
    );
    kv("Version:", &output.version, w);
    kv("Settings:", &output.settings_file, w);
    kv("Glyph:", on_off(output.enabled), w);
    println!();

    println!("Preferences:");
    for state in &output.preferences {
        let label = format!("{}:", state.preference);
        let value = if state.preference.is_switch() {
            on_off(state.value != 0).to_string()
        } else {
            state.value.to_string()
        };
        if state.enabled {
            kv_indent(&label, value, w);
        } else {
            kv_indent(&label, format_args!("{value} (inactive)"), w);
        }
    }
    println!();

    println!("Services (desired):");
    for (kind, action) in output.plan.actions() {
        let state = match action {
            ServiceAction::Start => "running",
            ServiceAction::Stop => "stopped",
        };
        kv_indent(&format!("{kind}:"), state, w);
    }
    Ok(())
}
