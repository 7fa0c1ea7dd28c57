//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Path => show_path(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    let config = &ctx.config;
    ctx.output.header("Current Configuration");

    ctx.output.info("[pricing]");
    ctx.output.kv("currency", &config.pricing.currency);
    ctx.output
        .kv("free_shipping_threshold", &config.pricing.free_shipping_threshold.to_string());
    ctx.output.kv("shipping_fee", &config.pricing.shipping_fee.to_string());
    ctx.output.kv("tax_rate_percent", &config.pricing.tax_rate_percent.to_string());

    ctx.output.info("[promos]");
    for promo in ctx.config.promo_table()?.iter() {
        ctx.output.list_item(&format!("{} - {}", promo.code, promo.description));
    }

    ctx.output.info("[search]");
    ctx.output.kv("page_size", &config.search.page_size.to_string());
    ctx.output.kv("debounce_ms", &config.search.debounce_ms.to_string());
    if let Some(dir) = &config.search.data_dir {
        ctx.output.kv("data_dir", &dir.display().to_string());
    }

    ctx.output.info("[api]");
    if let Some(url) = &config.api.base_url {
        ctx.output.kv("base_url", url);
    }
    ctx.output.kv("timeout_secs", &config.api.timeout_secs.to_string());
    ctx.output.kv("retries", &config.api.retries.to_string());

    ctx.output.info("[cart]");
    ctx.output.kv("snapshot", &ctx.cart_path().display().to_string());

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    match &ctx.config_path {
        Some(path) if ctx.output.is_json() => {
            ctx.output.json(&serde_json::json!({ "path": path }));
        }
        Some(path) => println!("{}", path.display()),
        None if ctx.output.is_json() => ctx.output.json(&serde_json::json!({ "path": null })),
        None => ctx
            .output
            .info("No config file found; using defaults. Run `voyage config init` to create one."),
    }
    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("voyage.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = ctx.config.validate();

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
