//! Command-line interface for PromptRelay

use clap::Parser;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod client;
mod commands;
mod config;
mod error;
mod output;

use cli::*;
use config::RelayctlConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    // RUST_LOG wins over -v
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match RelayctlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let config = config.with_overrides(&args);

    let result = match args.command {
        Commands::Serve { .. } => commands::serve::handle_serve_command(config).await,
        Commands::Prompt { text, field, .. } => {
            commands::prompt::handle_prompt_command(&text, field.into(), &config).await
        }
        Commands::Config => commands::config::handle_config_command(&config),
    };

    match result {
        Ok(_) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}
