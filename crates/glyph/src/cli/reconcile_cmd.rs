//! `reconcile` subcommand — apply the current settings once.

use std::path::Path;

use glyph_lib::service::ServiceAction;

use super::{AppContext, ReconcilePlan, Result, kv_indent, kv_width, print_json};

/// Print the services and brightness a plan resulted in.
pub(super) fn print_plan(plan: &ReconcilePlan, json: bool) -> Result<()> {
    if json {
        return print_json(plan);
    }
    let w = kv_width(&[], &["notifications:", "brightness:"]);
    println!("Services:");
    for (kind, action) in plan.actions() {
        let label = format!("{kind}:");
        let state = match action {
            ServiceAction::Start => "running",
            ServiceAction::Stop => "stopped",
        };
        kv_indent(&label, state, w);
    }
    match plan.brightness {
        Some(level) => kv_indent("brightness:", level, w),
        None => kv_indent("brightness:", "(not applied, glyph off)", w),
    }
    Ok(())
}

pub(super) fn cmd_reconcile(json: bool, config_path: Option<&Path>) -> Result<()> {
    let ctx = AppContext::open(config_path)?;
    let plan = ctx.controller().reconcile();
    print_plan(&plan, json)
}
