// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            body,
            filename,
            manifest,
            href_mode,
        } => commands::cmd_process(
            &config,
            body.as_deref(),
            filename.as_deref(),
            &manifest,
            href_mode,
        ),
        Commands::Local {
            epub,
            manifest,
            output,
            base_url,
            href_mode,
        } => commands::cmd_local(
            &config,
            &epub,
            &manifest,
            &output,
            base_url.as_deref(),
            href_mode,
        ),
        Commands::ContentType { paths } => commands::cmd_content_type(&paths),
    }
}
