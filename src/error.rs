//! Error types for Phototag
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! Only transport-class failures and configuration failures travel as
//! errors. A backend answering `success: false` is an ordinary response
//! and is carried in the payload, not in this enum.

use thiserror::Error;

/// Main error type for Phototag operations
#[derive(Error, Debug)]
pub enum PhototagError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tagging session was requested without a session id
    #[error("Missing session id: choose a session before tagging")]
    MissingSession,

    /// Label is not part of the configured category set
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Backend answered but refused the request (`success: false`)
    #[error("Backend rejected request: {0}")]
    BackendRejection(String),

    /// Network failure, timeout, non-2xx status or unreadable body
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Image payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Operation requires a capability this deployment has switched off
    #[error("Capability disabled: {0}")]
    CapabilityDisabled(String),

    /// Invalid backend URL
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Line editor errors from the interactive loop
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Phototag operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
