//! Session listing
//!
//! The directory is the entry point of a labeling run: it lists the
//! sessions the backend knows about and turns the operator's pick into a
//! [`TaggingSession`].

use std::sync::Arc;

use crate::backend::{Backend, SessionListEntry};
use crate::config::LabelingConfig;
use crate::error::Result;
use crate::render::{Notice, RenderSink};
use crate::session::{TaggingSession, GENERIC_FAILURE};

/// Lists labeling sessions and opens the chosen one
pub struct SessionDirectory {
    backend: Arc<dyn Backend>,
    sink: Arc<dyn RenderSink>,
}

impl SessionDirectory {
    /// Create a directory backed by `backend`
    pub fn new(backend: Arc<dyn Backend>, sink: Arc<dyn RenderSink>) -> Self {
        Self { backend, sink }
    }

    /// Fetch the session listing
    ///
    /// Failures are reported to the sink as a notice and yield an empty
    /// listing.
    pub async fn list_sessions(&self) -> Vec<SessionListEntry> {
        self.sink.set_busy(true);
        let response = self.backend.available_sessions().await;
        self.sink.set_busy(false);

        match response {
            Ok(response) if response.success => {
                tracing::info!("Backend lists {} sessions", response.data.len());
                response.data
            }
            Ok(response) => {
                let message = response
                    .info
                    .unwrap_or_else(|| "No sessions available".to_string());
                tracing::warn!(info = %message, "Session listing rejected");
                self.sink.notify(&Notice::warning(message));
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(error = %err, "Session listing failed");
                self.sink.notify(&Notice::error(GENERIC_FAILURE));
                Vec::new()
            }
        }
    }

    /// Open a tagging session for a listed entry
    ///
    /// The returned session is `Idle`; call
    /// [`TaggingSession::initialize`] to fetch the first image.
    ///
    /// # Errors
    ///
    /// Returns error if the entry's id is blank or `labeling` is unusable
    pub fn open(&self, entry: &SessionListEntry, labeling: LabelingConfig) -> Result<TaggingSession> {
        tracing::info!(session = %entry.session_id, "Opening session");
        TaggingSession::new(
            entry.session_id.clone(),
            labeling,
            self.backend.clone(),
            self.sink.clone(),
        )
    }
}
