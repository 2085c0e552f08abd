//! Presentation boundary of the tagging core
//!
//! The core never draws anything itself. It pushes display instructions to
//! a [`RenderSink`]: the image on screen, the stats summary, the prediction
//! hint, the busy indicator and user-facing notices.
//!
//! [`RecordingSink`] keeps every instruction in memory, for headless
//! drivers and tests. [`BusyTracker`] sits in front of a sink shared by
//! several components and derives one busy indicator from all of them.

use std::fmt;
use std::sync::{Arc, Mutex};

use base64::Engine as _;

use crate::content_type;
use crate::error::{PhototagError, Result};
use crate::session::SessionState;
use crate::stats::StatsSummary;

/// The image currently on screen
///
/// Fields are private so an `ImageRef` is only ever built whole and
/// replaced whole.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageRef {
    filename: String,
    bytes: Vec<u8>,
    content_type: &'static str,
}

impl ImageRef {
    /// Build an image, resolving the MIME type from the filename
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = content_type::resolve_filename(&filename);
        Self {
            filename,
            bytes,
            content_type,
        }
    }

    /// Decode a base64 payload as sent by the backend
    ///
    /// Embedded whitespace (MIME-style line breaks) is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PhototagError::Decode`] if the payload is not valid base64
    ///
    /// # Examples
    ///
    /// ```
    /// use phototag::render::ImageRef;
    ///
    /// let image = ImageRef::from_base64("a.png", "aGVs\nbG8=\n").unwrap();
    /// assert_eq!(image.bytes(), b"hello");
    /// assert_eq!(image.content_type(), "image/png");
    /// ```
    pub fn from_base64(filename: impl Into<String>, payload: &str) -> Result<Self> {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| PhototagError::Decode(format!("invalid base64 image: {}", e)))?;
        Ok(Self::new(filename, bytes))
    }

    /// Stable identity used when labeling this image
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Raw image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type derived from the filename extension
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// How a notice should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Acknowledgement of a completed action
    Info,
    /// Expected, non-fatal outcome such as an exhausted session
    Warning,
    /// Unexpected failure
    Error,
}

/// A user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Presentation tone
    pub tone: Tone,
    /// Message text
    pub message: String,
}

impl Notice {
    /// Informational notice
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Info,
            message: message.into(),
        }
    }

    /// Warning notice
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Warning,
            message: message.into(),
        }
    }

    /// Error notice
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receiver of display instructions
///
/// Sessions call the sink while holding their state lock, so callbacks
/// observe transitions in order. Implementations must not call back into
/// the session that is driving them.
pub trait RenderSink: Send + Sync {
    /// Show `image` as the current image
    fn show_image(&self, image: &ImageRef);

    /// Show the stats summary; an empty summary clears the display
    fn show_stats(&self, summary: &StatsSummary);

    /// Show the backend's guess for the current image, or no hint
    fn show_predicted(&self, category: Option<&str>);

    /// Toggle the busy indicator
    ///
    /// Every component pairs each `true` with exactly one `false` once its
    /// request completes.
    fn set_busy(&self, busy: bool);

    /// Present a notice to the operator
    fn notify(&self, notice: &Notice);

    /// Remove the current image from the display
    fn clear_image(&self) {}

    /// Called after every state transition of a tagging session
    fn state_changed(&self, _state: SessionState) {}
}

/// Sink adapter that reports busy while any request is outstanding
///
/// The session, the directory and the side-channel actions each bracket
/// their own requests. Wrapping the shared sink in one tracker makes the
/// forwarded indicator `true` until the last of them has finished.
pub struct BusyTracker {
    inner: Arc<dyn RenderSink>,
    outstanding: Mutex<usize>,
}

impl BusyTracker {
    /// Track busy state in front of `inner`
    pub fn new(inner: Arc<dyn RenderSink>) -> Self {
        Self {
            inner,
            outstanding: Mutex::new(0),
        }
    }

    /// Number of requests currently outstanding
    pub fn outstanding(&self) -> usize {
        *self
            .outstanding
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for BusyTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusyTracker")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

impl RenderSink for BusyTracker {
    fn show_image(&self, image: &ImageRef) {
        self.inner.show_image(image);
    }

    fn show_stats(&self, summary: &StatsSummary) {
        self.inner.show_stats(summary);
    }

    fn show_predicted(&self, category: Option<&str>) {
        self.inner.show_predicted(category);
    }

    fn set_busy(&self, busy: bool) {
        let mut outstanding = self
            .outstanding
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if busy {
            *outstanding += 1;
        } else {
            *outstanding = outstanding.saturating_sub(1);
        }
        // forwarded under the lock so the inner sink sees counts in order
        self.inner.set_busy(*outstanding > 0);
    }

    fn notify(&self, notice: &Notice) {
        self.inner.notify(notice);
    }

    fn clear_image(&self) {
        self.inner.clear_image();
    }

    fn state_changed(&self, state: SessionState) {
        self.inner.state_changed(state);
    }
}

/// One display instruction captured by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// `show_image`
    Image(ImageRef),
    /// `show_stats`
    Stats(StatsSummary),
    /// `show_predicted`
    Predicted(Option<String>),
    /// `set_busy`
    Busy(bool),
    /// `notify`
    Notice(Notice),
    /// `clear_image`
    ClearImage,
    /// `state_changed`
    State(SessionState),
}

/// Sink that records every instruction in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RenderEvent>>,
}

impl RecordingSink {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: RenderEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    /// All instructions received so far
    pub fn events(&self) -> Vec<RenderEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Notices received so far
    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Images shown so far
    pub fn images(&self) -> Vec<ImageRef> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Image(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Most recent stats summary
    pub fn last_stats(&self) -> Option<StatsSummary> {
        self.events().into_iter().rev().find_map(|e| match e {
            RenderEvent::Stats(s) => Some(s),
            _ => None,
        })
    }

    /// Most recent prediction hint instruction
    pub fn last_predicted(&self) -> Option<Option<String>> {
        self.events().into_iter().rev().find_map(|e| match e {
            RenderEvent::Predicted(p) => Some(p),
            _ => None,
        })
    }

    /// Most recent busy indicator value
    pub fn last_busy(&self) -> Option<bool> {
        self.events().into_iter().rev().find_map(|e| match e {
            RenderEvent::Busy(b) => Some(b),
            _ => None,
        })
    }
}

impl RenderSink for RecordingSink {
    fn show_image(&self, image: &ImageRef) {
        self.record(RenderEvent::Image(image.clone()));
    }

    fn show_stats(&self, summary: &StatsSummary) {
        self.record(RenderEvent::Stats(summary.clone()));
    }

    fn show_predicted(&self, category: Option<&str>) {
        self.record(RenderEvent::Predicted(category.map(str::to_string)));
    }

    fn set_busy(&self, busy: bool) {
        self.record(RenderEvent::Busy(busy));
    }

    fn notify(&self, notice: &Notice) {
        self.record(RenderEvent::Notice(notice.clone()));
    }

    fn clear_image(&self) {
        self.record(RenderEvent::ClearImage);
    }

    fn state_changed(&self, state: SessionState) {
        self.record(RenderEvent::State(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_resolves_content_type() {
        let image = ImageRef::new("IMG_01.GIF", vec![1, 2, 3]);
        assert_eq!(image.filename(), "IMG_01.GIF");
        assert_eq!(image.content_type(), "image/gif");
        assert_eq!(image.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_from_base64_ignores_line_breaks() {
        let image = ImageRef::from_base64("x.jpg", "AQID\r\nBA==\n").unwrap();
        assert_eq!(image.bytes(), &[1, 2, 3, 4]);
        assert_eq!(image.content_type(), "image/jpeg");
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        let err = ImageRef::from_base64("x.jpg", "not*base64").unwrap_err();
        assert!(err.to_string().contains("invalid base64"));
    }

    #[test]
    fn test_image_ref_debug_hides_bytes() {
        let image = ImageRef::new("a.png", vec![0; 4096]);
        let debug = format!("{:?}", image);
        assert!(debug.contains("len: 4096"));
        assert!(debug.len() < 200);
    }

    #[test]
    fn test_notice_constructors() {
        assert_eq!(Notice::info("ok").tone, Tone::Info);
        assert_eq!(Notice::warning("hm").tone, Tone::Warning);
        assert_eq!(Notice::error("no").tone, Tone::Error);
        assert_eq!(Notice::error("no").to_string(), "no");
    }

    #[test]
    fn test_recording_sink_records_in_order() {
        let sink = RecordingSink::new();
        sink.set_busy(true);
        sink.show_predicted(Some("keep"));
        sink.notify(&Notice::info("hello"));
        sink.set_busy(false);

        assert_eq!(
            sink.events(),
            vec![
                RenderEvent::Busy(true),
                RenderEvent::Predicted(Some("keep".to_string())),
                RenderEvent::Notice(Notice::info("hello")),
                RenderEvent::Busy(false),
            ]
        );
        assert_eq!(sink.last_busy(), Some(false));
        assert_eq!(sink.notices().len(), 1);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_busy_tracker_stays_busy_until_last_request() {
        let recording = Arc::new(RecordingSink::new());
        let tracker = BusyTracker::new(recording.clone());

        tracker.set_busy(true);
        tracker.set_busy(true);
        assert_eq!(tracker.outstanding(), 2);

        tracker.set_busy(false);
        assert_eq!(recording.last_busy(), Some(true));

        tracker.set_busy(false);
        assert_eq!(recording.last_busy(), Some(false));
        assert_eq!(tracker.outstanding(), 0);

        // an unmatched release never goes negative
        tracker.set_busy(false);
        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(recording.last_busy(), Some(false));
    }

    #[test]
    fn test_busy_tracker_forwards_other_calls() {
        let recording = Arc::new(RecordingSink::new());
        let tracker = BusyTracker::new(recording.clone());

        tracker.notify(&Notice::warning("careful"));
        tracker.clear_image();
        tracker.state_changed(SessionState::Loading);

        assert_eq!(
            recording.events(),
            vec![
                RenderEvent::Notice(Notice::warning("careful")),
                RenderEvent::ClearImage,
                RenderEvent::State(SessionState::Loading),
            ]
        );
    }
}
