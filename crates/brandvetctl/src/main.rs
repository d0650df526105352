//! Brandvet Control - one-shot CLI caller for the validation engine.
//!
//! The engine itself makes no persistence or UI decisions; this binary is
//! the thin application layer that loads config, runs one validation, and
//! renders the verdict.

mod cli;
mod output;

use std::path::Path;

use anyhow::{Context, Result};
use brandvet::ValidationEngine;
use brandvet_common::{CategoryContext, EngineConfig, ValidationRequest, CONFIG_PATH};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ValidateArgs};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Path::new(CONFIG_PATH).to_path_buf());
    let config = EngineConfig::load(&config_path).context("loading engine config")?;

    match cli.command {
        Commands::Validate(args) => run_validate(config, args).await,
        Commands::Config => show_config(&config),
    }
}

async fn run_validate(config: EngineConfig, args: ValidateArgs) -> Result<()> {
    let engine =
        ValidationEngine::with_default_tiers(config).context("building validation engine")?;

    let mut request = ValidationRequest::new(
        args.label,
        args.text,
        CategoryContext::new(args.category, args.allowed_labels),
    )
    .context("building validation request")?;
    if let Some(translated) = args.translated {
        request = request.with_translation(translated);
    }
    if !args.image_urls.is_empty() {
        request = request.with_known_images(args.image_urls);
    }

    let verdict = engine.validate(request).await.context("running validation")?;

    if args.json {
        println!("{}", output::render_json(&verdict)?);
    } else {
        print!("{}", output::render_pretty(&verdict));
    }

    std::process::exit(output::exit_code(verdict.pattern));
}

fn show_config(config: &EngineConfig) -> Result<()> {
    println!(
        "{}",
        toml::to_string_pretty(config).context("serializing config")?
    );
    Ok(())
}
