//! Export of labeled images
//!
//! Asks the backend to copy every labeled image of a session into one
//! folder per category. The backend's message is passed through as the
//! notice on both outcomes; only the tone differs.

use std::sync::Arc;

use crate::backend::{Backend, SessionId};
use crate::render::{Notice, RenderSink};
use crate::session::{ActionOutcome, InFlight, GENERIC_FAILURE};

const EXPORT_DONE: &str = "Labeled images copied";
const EXPORT_REFUSED: &str = "Export failed";
const EXPORT_BUSY: &str = "An export is already running";

/// Copies labeled images into per-category folders
pub struct Exporter {
    backend: Arc<dyn Backend>,
    sink: Arc<dyn RenderSink>,
    in_flight: InFlight,
}

impl Exporter {
    /// Create an exporter
    pub fn new(backend: Arc<dyn Backend>, sink: Arc<dyn RenderSink>) -> Self {
        Self {
            backend,
            sink,
            in_flight: InFlight::default(),
        }
    }

    /// Whether an export request is outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_set()
    }

    /// Export the labeled images of `session`
    ///
    /// Emits exactly one notice. While a request is outstanding further
    /// calls return [`ActionOutcome::Busy`] without contacting the backend.
    pub async fn export_labeled(&self, session: &SessionId) -> ActionOutcome {
        let Some(_guard) = self.in_flight.try_claim() else {
            tracing::debug!(session = %session, "Export already in flight");
            self.sink.notify(&Notice::warning(EXPORT_BUSY));
            return ActionOutcome::Busy;
        };

        tracing::info!(session = %session, "Exporting labeled images");
        self.sink.set_busy(true);
        let response = self.backend.copy_to_folders(session).await;
        self.sink.set_busy(false);

        match response {
            Ok(response) if response.success => {
                let message = response.info.unwrap_or_else(|| EXPORT_DONE.to_string());
                self.sink.notify(&Notice::info(message.clone()));
                ActionOutcome::Acknowledged(message)
            }
            Ok(response) => {
                let message = response.info.unwrap_or_else(|| EXPORT_REFUSED.to_string());
                tracing::warn!(session = %session, "Export refused: {}", message);
                self.sink.notify(&Notice::warning(message.clone()));
                ActionOutcome::Rejected(message)
            }
            Err(err) => {
                tracing::warn!(session = %session, error = %err, "Export request failed");
                self.sink.notify(&Notice::error(GENERIC_FAILURE));
                ActionOutcome::Failed
            }
        }
    }
}
