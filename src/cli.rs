//! Command-line interface definition for Phototag
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for listing sessions, tagging, training and export.

use clap::{Parser, Subcommand};

/// Phototag - interactive image labeling client
///
/// Shows one image at a time from a labeling backend, records the
/// category the operator picks and advances to the next unlabeled image.
#[derive(Parser, Debug, Clone)]
#[command(name = "phototag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL from config
    #[arg(long, env = "PHOTOTAG_API_URL")]
    pub api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Phototag
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List labeling sessions and their progress
    Sessions,

    /// Start the interactive tagging loop
    Tag {
        /// Session to tag; when omitted the session list is shown first
        #[arg(short, long, env = "PHOTOTAG_SESSION")]
        session: Option<String>,
    },

    /// Ask the backend to train a model for a session
    Train {
        /// Session whose labels are used for training
        #[arg(short, long)]
        session: String,

        /// Train from scratch instead of fine-tuning the existing model
        #[arg(long)]
        full: bool,
    },

    /// Copy the labeled images of a session into per-category folders
    Export {
        /// Session to export
        #[arg(short, long)]
        session: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_url: None,
            command: Commands::Sessions,
        }
    }
}
