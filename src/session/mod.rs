//! Labeling session workflow
//!
//! - [`directory::SessionDirectory`] lists sessions and opens one.
//! - [`tagging::TaggingSession`] drives fetch, label and advance for one
//!   session.
//! - [`training::TrainingTrigger`] and [`export::Exporter`] are side
//!   channels that never touch the tagging state.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod directory;
pub mod export;
pub mod tagging;
pub mod training;

pub use directory::SessionDirectory;
pub use export::Exporter;
pub use tagging::{SessionState, TaggingSession};
pub use training::TrainingTrigger;

/// Notice shown for transport-class failures
pub const GENERIC_FAILURE: &str = "Could not reach the labeling backend, please try again";

/// Result of a fire-and-acknowledge action (training, export)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Backend accepted; carries the acknowledgement text
    Acknowledged(String),
    /// Backend refused; carries its message
    Rejected(String),
    /// Transport failure
    Failed,
    /// Another request of the same kind is still outstanding
    Busy,
    /// The deployment has this capability switched off
    Disabled,
}

impl ActionOutcome {
    /// True for [`ActionOutcome::Acknowledged`]
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, ActionOutcome::Acknowledged(_))
    }
}

/// Single-flight flag shared by the side-channel actions
#[derive(Debug, Default)]
pub(crate) struct InFlight(AtomicBool);

impl InFlight {
    /// Claim the flag; `None` while another claim is alive
    pub(crate) fn try_claim(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the [`InFlight`] flag on drop
pub(crate) struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
