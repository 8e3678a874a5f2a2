//! `config` subcommand — show current configuration and file paths.

use std::path::Path;

use super::{Config, ConfigOutput, GlyphError, Result, kv, kv_indent, kv_width, print_json};

pub(super) fn cmd_config(init: bool, json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    if init {
        init_config(config_path.as_deref())?;
    }
    let config = super::load_config(custom_path);
    let config_exists = config_path.as_ref().map(|p| p.exists()).unwrap_or(false);
    let settings_path = config.resolve_settings_path(config_path.as_deref());
    let problems: Vec<String> = match config.validate() {
        Ok(()) => vec![],
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    };

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings_file: settings_path.as_ref().map(|p| p.display().to_string()),
            settings: config,
            problems,
        };
        return print_json(&output);
    }

    let w = kv_width(
        &["Config file:", "Settings file:"],
        &[
            "brightness_path:",
            "single_led_path:",
            "brightness_levels:",
            "watch_interval_ms:",
            "command_timeout_secs:",
        ],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    match &settings_path {
        Some(p) => kv("Settings file:", p.display(), w),
        None => kv("Settings file:", "(no config directory)", w),
    }
    println!();

    println!("LED:");
    kv_indent("brightness_path:", &config.led.brightness_path, w);
    kv_indent("single_led_path:", &config.led.single_led_path, w);
    kv_indent(
        "brightness_levels:",
        format_args!("{:?}", config.led.brightness_levels),
        w,
    );
    println!();

    println!("Services:");
    kv_indent(
        "command_timeout_secs:",
        config.services.command_timeout_secs,
        w,
    );
    for kind in glyph_lib::service::ServiceKind::ALL {
        let cmds = config.services.commands(kind);
        let show = |c: &str| {
            if c.trim().is_empty() {
                "(none)".to_string()
            } else {
                c.to_string()
            }
        };
        kv_indent(
            &format!("{kind}:"),
            format_args!("start {} / stop {}", show(&cmds.start), show(&cmds.stop)),
            w,
        );
    }
    kv_indent("watch_interval_ms:", config.watch_interval_ms, w);

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}

/// Write the default config to `path` unless a file is already there.
fn init_config(path: Option<&Path>) -> Result<()> {
    let path = path.ok_or_else(|| GlyphError::Config("no config directory".into()))?;
    if path.exists() {
        log::warn!("{} already exists, leaving it untouched", path.display());
        return Ok(());
    }
    Config::default().save_to(path)?;
    log::info!("wrote default config to {}", path.display());
    Ok(())
}
