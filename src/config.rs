//! Configuration management for Phototag
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{PhototagError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Phototag
///
/// Holds the backend location, the label set of this deployment and
/// the optional terminal display settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Labeling backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Categories and optional capabilities of this deployment
    #[serde(default)]
    pub labeling: LabelingConfig,
    /// Terminal display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Labeling backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the endpoints are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout applied to every request (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl BackendConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Label set and capability flags
///
/// Deployments differ in which categories they offer and whether the
/// backend reports stats, predictions or can train a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Ordered set of valid label categories
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Render stats returned by the backend
    #[serde(default = "default_true")]
    pub supports_stats: bool,

    /// Render prediction hints returned by the backend
    #[serde(default = "default_true")]
    pub supports_prediction: bool,

    /// Allow training requests
    #[serde(default = "default_true")]
    pub supports_training: bool,
}

fn default_categories() -> Vec<String> {
    vec![
        "keep".to_string(),
        "work".to_string(),
        "screenshot".to_string(),
        "meme".to_string(),
        "forget".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            supports_stats: true,
            supports_prediction: true,
            supports_training: true,
        }
    }
}

impl LabelingConfig {
    /// Whether `category` is one of the configured labels
    pub fn is_known(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Terminal display configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// File the current image bytes are written to, for an external viewer
    #[serde(default)]
    pub preview_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PhototagError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PhototagError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("PHOTOTAG_API_URL") {
            tracing::debug!(base_url = %url, "Env override: PHOTOTAG_API_URL");
            self.backend.base_url = url;
        }

        if let Ok(timeout) = std::env::var("PHOTOTAG_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.backend.timeout_seconds = v,
                Err(_) => tracing::warn!("Invalid PHOTOTAG_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(categories) = std::env::var("PHOTOTAG_CATEGORIES") {
            let parsed: Vec<String> = categories
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if parsed.is_empty() {
                tracing::warn!("Ignoring empty PHOTOTAG_CATEGORIES");
            } else {
                tracing::debug!(?parsed, "Env override: PHOTOTAG_CATEGORIES");
                self.labeling.categories = parsed;
            }
        }

        apply_bool_env("PHOTOTAG_SUPPORTS_STATS", &mut self.labeling.supports_stats);
        apply_bool_env(
            "PHOTOTAG_SUPPORTS_PREDICTION",
            &mut self.labeling.supports_prediction,
        );
        apply_bool_env(
            "PHOTOTAG_SUPPORTS_TRAINING",
            &mut self.labeling.supports_training,
        );

        if let Ok(preview) = std::env::var("PHOTOTAG_PREVIEW_PATH") {
            self.display.preview_path = Some(PathBuf::from(preview));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.api_url {
            tracing::debug!(base_url = %url, "CLI override: --api-url");
            self.backend.base_url = url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`PhototagError::Config`] if any check fails. An empty label
    /// set is rejected here so it never reaches a tagging session.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.backend.base_url).map_err(|e| {
            PhototagError::Config(format!(
                "Invalid backend.base_url '{}': {}",
                self.backend.base_url, e
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(PhototagError::Config(format!(
                "backend.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.backend.timeout_seconds == 0 {
            return Err(PhototagError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.backend.timeout_seconds > 600 {
            return Err(PhototagError::Config(
                "backend.timeout_seconds must be less than or equal to 600".to_string(),
            )
            .into());
        }

        validate_categories(&self.labeling.categories)
    }
}

/// Check a label set: non-empty, no blank entries, no duplicates
pub(crate) fn validate_categories(categories: &[String]) -> Result<()> {
    if categories.is_empty() {
        return Err(
            PhototagError::Config("labeling.categories cannot be empty".to_string()).into(),
        );
    }

    for (idx, category) in categories.iter().enumerate() {
        if category.trim().is_empty() {
            return Err(PhototagError::Config(
                "labeling.categories cannot contain empty names".to_string(),
            )
            .into());
        }
        if categories[..idx].contains(category) {
            return Err(PhototagError::Config(format!(
                "labeling.categories contains duplicate '{}'",
                category
            ))
            .into());
        }
    }

    Ok(())
}

fn apply_bool_env(name: &str, target: &mut bool) {
    if let Ok(value) = std::env::var(name) {
        match value.parse::<bool>() {
            Ok(v) => {
                *target = v;
                tracing::debug!(value = v, "Env override: {}", name);
            }
            Err(_) => tracing::warn!("Invalid value for {}: {}", name, value),
        }
    }
}
