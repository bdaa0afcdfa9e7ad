//! FileKeep: workspace, folder, and tag organizer for stored files.
//!
//! Entry point: parses the command line, loads configuration, initializes
//! logging, opens the stores, and runs one command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use filekeep_cli::{Cli, CliContext};
use filekeep_core::config::AppConfig;
use filekeep_core::error::AppError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(cli, config).await {
        tracing::debug!(kind = %e.kind, "Command failed");
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay, and environment variables
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let env = cli
        .env
        .clone()
        .or_else(|| std::env::var("FILEKEEP_ENV").ok());
    AppConfig::load(&cli.config, env.as_deref())
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Open the stores and execute the command
async fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    tracing::debug!("Starting FileKeep v{}", env!("CARGO_PKG_VERSION"));
    let ctx = CliContext::open(config).await?;
    cli.execute(&ctx).await
}
