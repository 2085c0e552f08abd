//! Phototag - interactive image labeling client library
//!
//! This library drives a labeling session against a remote tagging backend:
//! it fetches one image at a time, submits the operator's category and
//! advances, while keeping label statistics and the backend's prediction
//! hint up to date.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `backend`: Wire types, the `Backend` trait and its HTTP implementation
//! - `session`: Session listing, the tagging state machine, training and export
//! - `render`: The `RenderSink` interface the session draws through
//! - `stats`: Label statistics summaries
//! - `content_type`: File extension to MIME type mapping
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: CLI command handlers and the terminal sink
//!
//! # Example
//!
//! ```no_run
//! use phototag::{Config, HttpBackend, RecordingSink, TaggingSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.backend)?);
//!     let sink = Arc::new(RecordingSink::new());
//!     let session = TaggingSession::new("1", config.labeling.clone(), backend, sink)?;
//!     session.initialize().await;
//!     session.submit_label("keep").await;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod content_type;
pub mod error;
pub mod render;
pub mod session;
pub mod stats;

// Re-export commonly used types
pub use backend::{Backend, HttpBackend, SessionId, TrainMode};
pub use config::Config;
pub use error::{PhototagError, Result};
pub use render::{BusyTracker, ImageRef, Notice, RecordingSink, RenderSink, Tone};
pub use session::{
    ActionOutcome, Exporter, SessionDirectory, SessionState, TaggingSession, TrainingTrigger,
};
pub use stats::{summarize, StatsSummary};

#[cfg(test)]
pub mod test_utils;
