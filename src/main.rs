//! Phototag - interactive image labeling client
//!
#![doc = "Phototag - interactive image labeling client"]
#![doc = "Main entry point for the phototag binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use phototag::cli::{Cli, Commands};
use phototag::commands;
use phototag::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Sessions => {
            tracing::info!("Listing sessions");
            commands::sessions::run_sessions(config).await?;
            Ok(())
        }
        Commands::Tag { session } => {
            if let Some(s) = &session {
                tracing::debug!("Using session from command line: {}", s);
            }
            commands::tag::run_tag(config, session).await?;
            Ok(())
        }
        Commands::Train { session, full } => {
            tracing::info!("Requesting training for session {}", session);
            commands::train::run_train(config, session, full).await?;
            Ok(())
        }
        Commands::Export { session } => {
            tracing::info!("Exporting session {}", session);
            commands::export::run_export(config, session).await?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "phototag=debug"
    } else {
        "phototag=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
