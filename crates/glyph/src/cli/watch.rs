//! `watch` subcommand — reconcile whenever the settings change.

use std::path::Path;
use std::time::Duration;

use glyph_lib::watcher;

use super::{AppContext, RUNNING, Result, reconcile_cmd::print_plan};

pub(super) fn cmd_watch(config_path: Option<&Path>) -> Result<()> {
    let ctx = AppContext::open(config_path)?;
    let interval = Duration::from_millis(ctx.config.watch_interval_ms.max(1));

    println!("Watching {}", ctx.store.path().display());
    println!("Press Ctrl+C to exit (stops all services).");

    watcher::watch(
        &ctx.store,
        &ctx.services,
        &ctx.led,
        interval,
        &RUNNING,
        |plan| {
            println!();
            if let Err(e) = print_plan(plan, false) {
                log::warn!("{e}");
            }
        },
    );

    println!();
    println!("All services stopped.");
    Ok(())
}
