//! `apps` / `app` subcommands — per-app notification switches.

use std::path::{Path, PathBuf};

use glyph_lib::controller::parse_switch;
use glyph_lib::notifs::{self, APPS_TO_IGNORE};

use super::{AppContext, GlyphError, Result, on_off, print_json};

pub(super) fn cmd_apps(file: Option<&Path>, json: bool, config_path: Option<&Path>) -> Result<()> {
    let ctx = AppContext::open(config_path)?;
    let apps_path = match file {
        Some(p) => p.to_path_buf(),
        None if !ctx.config.apps_path.trim().is_empty() => {
            PathBuf::from(ctx.config.apps_path.trim())
        }
        None => {
            return Err(GlyphError::Config(
                "no app list: pass --file or set apps_path in the config".into(),
            ));
        }
    };
    let apps = notifs::load_apps(&apps_path)?;
    let toggles = notifs::app_toggles(&ctx.store, &apps, APPS_TO_IGNORE);

    if json {
        return print_json(&toggles);
    }
    if toggles.is_empty() {
        println!("No apps with a launcher entry.");
        return Ok(());
    }
    let width = toggles.iter().map(|t| t.label.len()).max().unwrap_or(0) + 2;
    for t in &toggles {
        println!(
            "{:<3} {:<width$}{}",
            on_off(t.enabled),
            t.label,
            t.package_name,
            width = width
        );
    }
    Ok(())
}

pub(super) fn cmd_app(package: &str, value: &str, config_path: Option<&Path>) -> Result<()> {
    let enabled = parse_switch(value)?;
    let ctx = AppContext::open(config_path)?;
    ctx.controller().set_app_enabled(package, enabled)?;
    println!("{package}: {}", on_off(enabled));
    Ok(())
}
