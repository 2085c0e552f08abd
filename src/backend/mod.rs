//! Labeling backend abstraction and implementations
//!
//! The [`Backend`] trait is the only way the tagging core talks to the
//! labeling server. Concrete implementations live in submodules:
//!
//! - [`http::HttpBackend`] -- JSON over HTTP using `reqwest`.
//! - [`fake::FakeBackend`] -- scripted in-process backend (cfg(test) only).
//!
//! # Error contract
//!
//! Methods return `Err` only for transport-class failures: connection
//! errors, timeouts, non-2xx statuses and unreadable bodies. A backend that
//! answers `success: false` returns `Ok` with that flag, since the core
//! treats rejections as an ordinary outcome.

use crate::error::Result;

pub mod http;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use http::HttpBackend;
pub use types::{
    ActionResponse, ImageResponse, SessionId, SessionListEntry, SessionsResponse, TagRequest,
    TrainMode, TrainReply, TrainRequest,
};

/// Endpoints of the labeling backend consumed by the client
#[async_trait::async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// `GET /get_available_sessions`
    async fn available_sessions(&self) -> Result<SessionsResponse>;

    /// `GET /random_image64?session=<id>`
    async fn random_image(&self, session: &SessionId) -> Result<ImageResponse>;

    /// `POST /tag_img_get_new`: store a label and fetch the next image
    async fn tag_image(&self, request: &TagRequest) -> Result<ImageResponse>;

    /// `GET /copy_imgs_to_new_folder?session=<id>`
    async fn copy_to_folders(&self, session: &SessionId) -> Result<ActionResponse>;

    /// `POST /train_model`
    ///
    /// Non-2xx statuses are reported through [`TrainReply::accepted`]
    /// rather than as errors, since the endpoint uses the status as its
    /// outcome flag.
    async fn train_model(&self, request: &TrainRequest) -> Result<TrainReply>;
}
