//! Configuration management commands.

use std::path::Path;

use anyhow::{bail, Result};

use super::{ConfigAction, ConfigArgs};
use crate::config::{generate_default_config, CliConfig, API_URL_ENV};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(ctx),
        ConfigAction::Init {
            base_url,
            file,
            force,
        } => init_config(&base_url, &file, force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    if std::env::var_os(API_URL_ENV).is_some() {
        ctx.output.kv("override", API_URL_ENV);
    }

    ctx.output.info("");
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &ctx.config.api.base_url);
    if let Some(ms) = ctx.config.api.timeout_ms {
        ctx.output.kv("timeout_ms", &ms.to_string());
    }

    let search = &ctx.config.search;
    ctx.output.info("");
    ctx.output.info("[search]");
    ctx.output.kv("endpoint", &search.endpoint);
    ctx.output.kv("search_debounce_ms", &search.search_debounce_ms.to_string());
    ctx.output.kv("filter_debounce_ms", &search.filter_debounce_ms.to_string());
    ctx.output.kv("slider_debounce_ms", &search.slider_debounce_ms.to_string());
    ctx.output.kv("suggest_debounce_ms", &search.suggest_debounce_ms.to_string());
    ctx.output.kv("settle_ms", &search.settle_ms.to_string());
    ctx.output.kv("recent_capacity", &search.recent_capacity.to_string());
    ctx.output.kv("recent_key", &search.recent_key);
    ctx.output.kv(
        "default_price_range",
        &format!("{} - {}", search.default_price_range.min, search.default_price_range.max),
    );

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("path", &ctx.storage_dir().display().to_string());

    Ok(())
}

fn init_config(base_url: &str, file: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.resolve_path(Path::new(file));

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let path = config_path.to_string_lossy();
    if path.ends_with(".json") {
        let mut config = CliConfig::default();
        config.api.base_url = base_url.to_string();
        config.save(&path)?;
    } else {
        std::fs::write(&config_path, generate_default_config(base_url))?;
    }

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
