//! Tagging session state machine
//!
//! One [`TaggingSession`] owns the view of one labeling session: the image
//! on screen, its prediction hint and the latest stats. Transitions:
//!
//! ```text
//! Idle --initialize--> Loading --ok--> Displaying --submit_label--> Submitting
//!                         |                ^                            |
//!                         |                +------------ok--------------+
//!                         +--rejected--> Exhausted <----rejected--------+
//!                         +--transport-> Error <-------transport--------+
//! ```
//!
//! At most one request is outstanding per session. Calls made while
//! `Loading` or `Submitting` return immediately without touching the
//! backend, whether they come from the UI or from code sharing the
//! session through an `Arc`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{Backend, ImageResponse, SessionId, TagRequest};
use crate::config::{validate_categories, LabelingConfig};
use crate::error::{PhototagError, Result};
use crate::render::{ImageRef, Notice, RenderSink};
use crate::session::GENERIC_FAILURE;
use crate::stats::{summarize, StatsSummary};

/// Notice used when the backend rejects without a message
pub const EXHAUSTED_MESSAGE: &str = "No more images to label in this session";

const UNREADABLE_IMAGE: &str = "The labeling backend sent an image that could not be read";

/// Lifecycle state of a [`TaggingSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, nothing fetched yet
    Idle,
    /// First image requested
    Loading,
    /// An image is on screen and can be labeled
    Displaying,
    /// A label was posted; waiting for the next image
    Submitting,
    /// The backend has nothing left for this session
    Exhausted,
    /// The last request failed in transport
    Error,
}

impl SessionState {
    /// Whether a request is outstanding
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Loading | SessionState::Submitting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Displaying => "displaying",
            SessionState::Submitting => "submitting",
            SessionState::Exhausted => "exhausted",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct View {
    state: SessionState,
    current: Option<ImageRef>,
    predicted: Option<String>,
    stats: StatsSummary,
}

/// Fetch, label and advance loop for one labeling session
pub struct TaggingSession {
    session_id: SessionId,
    labeling: LabelingConfig,
    backend: Arc<dyn Backend>,
    sink: Arc<dyn RenderSink>,
    view: Mutex<View>,
}

impl fmt::Debug for TaggingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggingSession")
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .finish()
    }
}

impl TaggingSession {
    /// Create a session in the `Idle` state
    ///
    /// No request is made until [`TaggingSession::initialize`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`PhototagError::MissingSession`] for a blank session id and
    /// [`PhototagError::Config`] for an unusable category set.
    pub fn new(
        session_id: impl Into<SessionId>,
        labeling: LabelingConfig,
        backend: Arc<dyn Backend>,
        sink: Arc<dyn RenderSink>,
    ) -> Result<Self> {
        let session_id = session_id.into();
        if session_id.is_blank() {
            return Err(PhototagError::MissingSession.into());
        }
        validate_categories(&labeling.categories)?;

        tracing::debug!(session = %session_id, "Created tagging session");

        Ok(Self {
            session_id,
            labeling,
            backend,
            sink,
            view: Mutex::new(View {
                state: SessionState::Idle,
                current: None,
                predicted: None,
                stats: StatsSummary::default(),
            }),
        })
    }

    /// Session being labeled
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Categories and capabilities in effect
    pub fn labeling(&self) -> &LabelingConfig {
        &self.labeling
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Whether a request is outstanding
    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    /// Image on screen, if any
    pub fn current(&self) -> Option<ImageRef> {
        self.lock().current.clone()
    }

    /// Prediction hint for the image on screen
    pub fn predicted(&self) -> Option<String> {
        self.lock().predicted.clone()
    }

    /// Stats from the latest backend response
    pub fn stats(&self) -> StatsSummary {
        self.lock().stats.clone()
    }

    /// Fetch the first image
    ///
    /// Valid from `Idle` and `Error`; ignored otherwise. `Exhausted` is
    /// final: open a new session to label again. Returns the state after
    /// the call.
    pub async fn initialize(&self) -> SessionState {
        {
            let mut view = self.lock();
            match view.state {
                SessionState::Idle | SessionState::Error => {}
                other => {
                    tracing::debug!(session = %self.session_id, state = %other, "Ignoring initialize");
                    return other;
                }
            }
            self.transition(&mut view, SessionState::Loading);
        }

        tracing::info!(session = %self.session_id, "Fetching next image");
        let response = self.backend.random_image(&self.session_id).await;
        self.apply(response)
    }

    /// Label the image on screen and advance to the next one
    ///
    /// Valid while `Displaying`, or in `Error` when an image is still on
    /// screen (retrying a failed submission). Ignored otherwise. An unknown
    /// category produces a notice and leaves the state unchanged.
    /// Returns the state after the call.
    pub async fn submit_label(&self, category: &str) -> SessionState {
        let request = {
            let mut view = self.lock();
            let filename = match (view.state, view.current.as_ref()) {
                (SessionState::Displaying | SessionState::Error, Some(image)) => {
                    image.filename().to_string()
                }
                (state, _) => {
                    tracing::debug!(session = %self.session_id, state = %state, "Ignoring label submission");
                    return state;
                }
            };

            if !self.labeling.is_known(category) {
                tracing::warn!(session = %self.session_id, category, "Unknown category");
                let err = PhototagError::UnknownCategory(category.to_string());
                self.sink.notify(&Notice::warning(err.to_string()));
                return view.state;
            }

            self.transition(&mut view, SessionState::Submitting);
            TagRequest {
                filename,
                img_type: category.to_string(),
                session_id: self.session_id.clone(),
            }
        };

        tracing::info!(
            session = %self.session_id,
            filename = %request.filename,
            category,
            "Submitting label"
        );
        let response = self.backend.tag_image(&request).await;
        self.apply(response)
    }

    fn lock(&self) -> MutexGuard<'_, View> {
        self.view
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Busy is only signalled when it flips, so every `set_busy(true)` is
    /// matched by one `set_busy(false)` on the shared sink.
    fn transition(&self, view: &mut View, next: SessionState) {
        let was_busy = view.state.is_busy();
        view.state = next;
        self.sink.state_changed(next);
        if was_busy != next.is_busy() {
            self.sink.set_busy(next.is_busy());
        }
    }

    fn apply(&self, response: Result<ImageResponse>) -> SessionState {
        let mut view = self.lock();
        match response {
            Err(err) => {
                tracing::warn!(session = %self.session_id, error = %err, "Backend request failed");
                self.fail(&mut view, GENERIC_FAILURE);
            }
            Ok(response) if response.is_success() => match decode_image(&response) {
                Ok(image) => self.display(&mut view, image, response),
                Err(err) => {
                    tracing::warn!(session = %self.session_id, error = %err, "Unreadable image payload");
                    self.fail(&mut view, UNREADABLE_IMAGE);
                }
            },
            Ok(response) => self.exhaust(&mut view, response),
        }
        view.state
    }

    fn display(&self, view: &mut View, image: ImageRef, response: ImageResponse) {
        tracing::info!(
            session = %self.session_id,
            filename = image.filename(),
            content_type = image.content_type(),
            "Displaying image"
        );

        self.sink.show_image(&image);
        view.current = Some(image);
        view.stats = summarize(response.stats.as_deref());
        view.predicted = if self.labeling.supports_prediction {
            response.predicted.filter(|p| self.labeling.is_known(p))
        } else {
            None
        };

        if self.labeling.supports_stats {
            self.sink.show_stats(&view.stats);
        }
        if self.labeling.supports_prediction {
            self.sink.show_predicted(view.predicted.as_deref());
        }
        self.transition(view, SessionState::Displaying);
    }

    fn exhaust(&self, view: &mut View, response: ImageResponse) {
        let message = response
            .info
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| EXHAUSTED_MESSAGE.to_string());
        tracing::warn!(session = %self.session_id, info = %message, "Backend has no image");

        view.current = None;
        view.predicted = None;
        view.stats = summarize(response.stats.as_deref());

        self.sink.clear_image();
        if self.labeling.supports_stats {
            self.sink.show_stats(&view.stats);
        }
        if self.labeling.supports_prediction {
            self.sink.show_predicted(None);
        }
        self.transition(view, SessionState::Exhausted);
        self.sink.notify(&Notice::warning(message));
    }

    fn fail(&self, view: &mut View, message: &str) {
        self.transition(view, SessionState::Error);
        self.sink.notify(&Notice::error(message));
    }
}

fn decode_image(response: &ImageResponse) -> Result<ImageRef> {
    match (&response.filename, &response.image) {
        (Some(filename), Some(payload)) => ImageRef::from_base64(filename.clone(), payload),
        _ => Err(PhototagError::Decode("response has no filename or image".to_string()).into()),
    }
}
