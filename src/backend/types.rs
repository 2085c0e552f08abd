//! Wire types for the labeling backend endpoints
//!
//! Field names follow the backend's JSON exactly; Rust-side names are
//! mapped with `serde(rename)`.

use crate::stats::StatsEntry;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque labeling session identifier
///
/// The backend emits session ids as JSON integers in listings while the
/// client sends them back as strings, so both forms deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is blank
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// One row of the session listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionListEntry {
    /// Session identifier
    pub session_id: SessionId,
    /// Images labeled so far
    #[serde(rename = "img_processed", default)]
    pub processed: u64,
    /// Images in the session
    #[serde(rename = "img_total", default)]
    pub total: u64,
}

impl fmt::Display for SessionListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Session {} - ({}/{})",
            self.session_id, self.processed, self.total
        )
    }
}

/// Response of `GET /get_available_sessions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsResponse {
    /// Whether the listing succeeded
    #[serde(default)]
    pub success: bool,
    /// Backend message, set on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// Available sessions
    #[serde(default)]
    pub data: Vec<SessionListEntry>,
}

/// Response of `GET /random_image64` and `POST /tag_img_get_new`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageResponse {
    /// Explicit outcome; older backends omit it on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Backend message, usually set when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// Name of the next image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Base64 image bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Category guessed by the backend model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted: Option<String>,
    /// Per-category counts for the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<StatsEntry>>,
}

impl ImageResponse {
    /// Whether the backend delivered a next image
    ///
    /// A missing `success` flag counts as success when both filename and
    /// image are present.
    pub fn is_success(&self) -> bool {
        self.success
            .unwrap_or(self.filename.is_some() && self.image.is_some())
    }
}

/// Body of `POST /tag_img_get_new`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRequest {
    /// Image being labeled
    pub filename: String,
    /// Chosen category
    #[serde(rename = "imgType")]
    pub img_type: String,
    /// Session the image belongs to
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
}

/// Response of `GET /copy_imgs_to_new_folder`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Whether the copy succeeded
    #[serde(default)]
    pub success: bool,
    /// Backend message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Training mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainMode {
    /// Train a model from scratch
    Full,
    /// Continue training the existing model
    FineTune,
}

impl fmt::Display for TrainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainMode::Full => write!(f, "full"),
            TrainMode::FineTune => write!(f, "fine-tune"),
        }
    }
}

/// Body of `POST /train_model`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRequest {
    /// Session whose labels feed the training
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
    /// Full training instead of fine-tuning
    #[serde(rename = "fullTrain")]
    pub full_train: bool,
}

impl TrainRequest {
    /// Build a request for `mode`
    pub fn new(session_id: SessionId, mode: TrainMode) -> Self {
        Self {
            session_id,
            full_train: mode == TrainMode::Full,
        }
    }
}

/// Outcome of `POST /train_model`
///
/// The endpoint signals success through the HTTP status; the body only
/// carries a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainReply {
    /// HTTP status was 2xx
    pub accepted: bool,
    /// `info` field of the body, when the body was readable
    pub info: Option<String>,
}
