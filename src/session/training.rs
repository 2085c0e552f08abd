//! Training requests
//!
//! Asks the backend to (re)train the prediction model of a session. The
//! request is fire-and-acknowledge: the outcome is a notice, and the
//! tagging session is not affected.

use std::sync::Arc;

use crate::backend::{Backend, SessionId, TrainMode, TrainRequest};
use crate::render::{Notice, RenderSink};
use crate::session::{ActionOutcome, InFlight};

const TRAINING_STARTED: &str = "Training started";
const TRAINING_FAILED: &str = "Training request failed";
const TRAINING_DISABLED: &str = "Training is not available for this deployment";
const TRAINING_BUSY: &str = "A training request is already running";

/// Starts training jobs, one at a time
pub struct TrainingTrigger {
    backend: Arc<dyn Backend>,
    sink: Arc<dyn RenderSink>,
    enabled: bool,
    in_flight: InFlight,
}

impl TrainingTrigger {
    /// Create a trigger; `enabled` mirrors the deployment's training flag
    pub fn new(backend: Arc<dyn Backend>, sink: Arc<dyn RenderSink>, enabled: bool) -> Self {
        Self {
            backend,
            sink,
            enabled,
            in_flight: InFlight::default(),
        }
    }

    /// Whether a training request is outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_set()
    }

    /// Request training for `session`
    ///
    /// Emits exactly one notice. While a request is outstanding further
    /// calls return [`ActionOutcome::Busy`] without contacting the backend.
    pub async fn train(&self, session: &SessionId, mode: TrainMode) -> ActionOutcome {
        if !self.enabled {
            self.sink.notify(&Notice::warning(TRAINING_DISABLED));
            return ActionOutcome::Disabled;
        }

        let Some(_guard) = self.in_flight.try_claim() else {
            tracing::debug!(session = %session, "Training already in flight");
            self.sink.notify(&Notice::warning(TRAINING_BUSY));
            return ActionOutcome::Busy;
        };

        tracing::info!(session = %session, mode = %mode, "Requesting training");
        self.sink.set_busy(true);
        let reply = self
            .backend
            .train_model(&TrainRequest::new(session.clone(), mode))
            .await;
        self.sink.set_busy(false);

        match reply {
            Ok(reply) if reply.accepted => {
                let message = reply.info.unwrap_or_else(|| TRAINING_STARTED.to_string());
                tracing::info!(session = %session, "Training acknowledged: {}", message);
                self.sink.notify(&Notice::info(message.clone()));
                ActionOutcome::Acknowledged(message)
            }
            Ok(reply) => {
                let message = reply.info.unwrap_or_else(|| TRAINING_FAILED.to_string());
                tracing::warn!(session = %session, "Training refused: {}", message);
                self.sink.notify(&Notice::error(message.clone()));
                ActionOutcome::Rejected(message)
            }
            Err(err) => {
                tracing::warn!(session = %session, error = %err, "Training request failed");
                self.sink.notify(&Notice::error(TRAINING_FAILED));
                ActionOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::backend::TrainReply;
    use crate::render::{RecordingSink, Tone};
    use std::time::Duration;

    fn setup(enabled: bool) -> (Arc<FakeBackend>, Arc<RecordingSink>, Arc<TrainingTrigger>) {
        let backend = Arc::new(FakeBackend::new());
        let sink = Arc::new(RecordingSink::new());
        let trigger = TrainingTrigger::new(backend.clone(), sink.clone(), enabled);
        (backend, sink, Arc::new(trigger))
    }

    #[tokio::test]
    async fn test_train_acknowledged() {
        let (backend, sink, trigger) = setup(true);
        backend.push_train(TrainReply {
            accepted: true,
            info: Some("Model trained, accuracy 0.91".to_string()),
        });

        let outcome = trigger.train(&SessionId::new("3"), TrainMode::Full).await;
        assert_eq!(
            outcome,
            ActionOutcome::Acknowledged("Model trained, accuracy 0.91".to_string())
        );
        assert_eq!(sink.notices()[0].tone, Tone::Info);
        assert!(backend.train_requests()[0].full_train);
        assert!(!trigger.is_busy());
    }

    #[tokio::test]
    async fn test_train_rejected_uses_backend_text() {
        let (backend, sink, trigger) = setup(true);
        backend.push_train(TrainReply {
            accepted: false,
            info: Some("Not enough labels".to_string()),
        });

        let outcome = trigger.train(&SessionId::new("3"), TrainMode::FineTune).await;
        assert_eq!(outcome, ActionOutcome::Rejected("Not enough labels".to_string()));
        assert_eq!(sink.notices(), vec![Notice::error("Not enough labels")]);
        assert!(!backend.train_requests()[0].full_train);
    }

    #[tokio::test]
    async fn test_train_rejected_without_text_is_generic() {
        let (backend, sink, trigger) = setup(true);
        backend.push_train(TrainReply {
            accepted: false,
            info: None,
        });

        trigger.train(&SessionId::new("3"), TrainMode::Full).await;
        assert_eq!(sink.notices(), vec![Notice::error(TRAINING_FAILED)]);
    }

    #[tokio::test]
    async fn test_train_transport_failure() {
        let (backend, sink, trigger) = setup(true);
        backend.push_train_failure("reset by peer");

        let outcome = trigger.train(&SessionId::new("3"), TrainMode::Full).await;
        assert_eq!(outcome, ActionOutcome::Failed);
        assert_eq!(sink.notices().len(), 1);
        assert!(!trigger.is_busy());
    }

    #[tokio::test]
    async fn test_train_disabled_makes_no_request() {
        let (backend, sink, trigger) = setup(false);
        let outcome = trigger.train(&SessionId::new("3"), TrainMode::Full).await;
        assert_eq!(outcome, ActionOutcome::Disabled);
        assert!(backend.train_requests().is_empty());
        assert_eq!(sink.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_train_busy_guard() {
        let (backend, _sink, trigger) = setup(true);
        let gate = backend.hold_requests();
        backend.push_train(TrainReply {
            accepted: true,
            info: None,
        });

        let pending = {
            let trigger = trigger.clone();
            tokio::spawn(async move { trigger.train(&SessionId::new("3"), TrainMode::Full).await })
        };
        for _ in 0..200 {
            if trigger.is_busy() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(trigger.is_busy());

        let second = trigger.train(&SessionId::new("3"), TrainMode::FineTune).await;
        assert_eq!(second, ActionOutcome::Busy);
        assert_eq!(backend.train_requests().len(), 1);

        gate.notify_one();
        assert_eq!(
            pending.await.unwrap(),
            ActionOutcome::Acknowledged(TRAINING_STARTED.to_string())
        );
        assert!(!trigger.is_busy());
    }
}
