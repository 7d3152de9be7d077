//! Triple-store server CLI
//!
//! One-shot commands against an RDFox-style triple-store server: bulk
//! data export, role and privilege management, statistics, and
//! maintenance operations.

use clap::Parser;

use triplectl::cli::Cli;
use triplectl::config::Config;
use triplectl::error::Result;
use triplectl::executor;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration (file, then environment overrides)
/// 3. Initialize logging
/// 4. Dispatch the subcommand
async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config_file.as_deref())?;

    initialize_logging(&cli, &config)?;

    executor::dispatch(&cli, &config).await
}

/// Initialize the logging system from the effective level
fn initialize_logging(cli: &Cli, config: &Config) -> Result<()> {
    let level = cli.log_level(config)?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.to_tracing_level())
        .with_target(false);

    if config.logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }

    Ok(())
}
