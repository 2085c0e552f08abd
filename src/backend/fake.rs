//! Scripted in-process backend for unit tests
//!
//! [`FakeBackend`] answers from queues filled by the test and records every
//! request it receives. Image and training requests can be held open with
//! [`FakeBackend::hold_requests`], exports with [`FakeBackend::hold_copies`],
//! to observe a component while a request is outstanding.
//!
//! ```text
//! test push_image(..) ---> images queue ---> random_image()/tag_image()
//! tag_image(request) ----> tag_requests ---> test reads tag_requests()
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::backend::types::{
    ActionResponse, ImageResponse, SessionId, SessionsResponse, TagRequest, TrainReply,
    TrainRequest,
};
use crate::backend::Backend;
use crate::error::{PhototagError, Result};

type Scripted<T> = Mutex<VecDeque<std::result::Result<T, String>>>;

/// In-process fake backend for use in tests.
#[derive(Debug, Default)]
pub struct FakeBackend {
    sessions: Scripted<SessionsResponse>,
    images: Scripted<ImageResponse>,
    copies: Scripted<ActionResponse>,
    trains: Scripted<TrainReply>,
    tag_requests: Mutex<Vec<TagRequest>>,
    train_requests: Mutex<Vec<TrainRequest>>,
    image_calls: AtomicUsize,
    copy_calls: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
    copy_gate: Mutex<Option<Arc<Notify>>>,
}

fn pop<T>(queue: &Scripted<T>, what: &str) -> Result<T> {
    let next = queue
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop_front();
    match next {
        Some(Ok(value)) => Ok(value),
        Some(Err(message)) => Err(PhototagError::Transport(message).into()),
        None => Err(PhototagError::Transport(format!("no scripted {} response", what)).into()),
    }
}

fn push<T>(queue: &Scripted<T>, item: std::result::Result<T, String>) {
    queue
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push_back(item);
}

impl FakeBackend {
    /// Create an empty fake; unscripted calls fail as transport errors
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next image request
    pub fn push_image(&self, response: ImageResponse) {
        push(&self.images, Ok(response));
    }

    /// Make the next image request fail at the transport level
    pub fn push_image_failure(&self, message: &str) {
        push(&self.images, Err(message.to_string()));
    }

    /// Queue the answer to the next session listing
    pub fn push_sessions(&self, response: SessionsResponse) {
        push(&self.sessions, Ok(response));
    }

    /// Make the next session listing fail at the transport level
    pub fn push_sessions_failure(&self, message: &str) {
        push(&self.sessions, Err(message.to_string()));
    }

    /// Queue the answer to the next export request
    pub fn push_copy(&self, response: ActionResponse) {
        push(&self.copies, Ok(response));
    }

    /// Make the next export request fail at the transport level
    pub fn push_copy_failure(&self, message: &str) {
        push(&self.copies, Err(message.to_string()));
    }

    /// Queue the answer to the next training request
    pub fn push_train(&self, reply: TrainReply) {
        push(&self.trains, Ok(reply));
    }

    /// Make the next training request fail at the transport level
    pub fn push_train_failure(&self, message: &str) {
        push(&self.trains, Err(message.to_string()));
    }

    /// Block image and training requests until the returned handle is notified
    pub fn hold_requests(&self) -> Arc<Notify> {
        install_gate(&self.gate)
    }

    /// Block export requests until the returned handle is notified
    pub fn hold_copies(&self) -> Arc<Notify> {
        install_gate(&self.copy_gate)
    }

    /// Label submissions received so far
    pub fn tag_requests(&self) -> Vec<TagRequest> {
        self.tag_requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Training requests received so far
    pub fn train_requests(&self) -> Vec<TrainRequest> {
        self.train_requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Number of image requests (initial fetch plus submissions)
    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    /// Number of export requests
    pub fn copy_calls(&self) -> usize {
        self.copy_calls.load(Ordering::SeqCst)
    }
}

fn install_gate(slot: &Mutex<Option<Arc<Notify>>>) -> Arc<Notify> {
    let notify = Arc::new(Notify::new());
    *slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(notify.clone());
    notify
}

async fn wait_gate(slot: &Mutex<Option<Arc<Notify>>>) {
    let gate = slot.lock().unwrap_or_else(|p| p.into_inner()).clone();
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn available_sessions(&self) -> Result<SessionsResponse> {
        pop(&self.sessions, "sessions")
    }

    async fn random_image(&self, _session: &SessionId) -> Result<ImageResponse> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        wait_gate(&self.gate).await;
        pop(&self.images, "image")
    }

    async fn tag_image(&self, request: &TagRequest) -> Result<ImageResponse> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.tag_requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request.clone());
        wait_gate(&self.gate).await;
        pop(&self.images, "image")
    }

    async fn copy_to_folders(&self, _session: &SessionId) -> Result<ActionResponse> {
        self.copy_calls.fetch_add(1, Ordering::SeqCst);
        wait_gate(&self.copy_gate).await;
        pop(&self.copies, "copy")
    }

    async fn train_model(&self, request: &TrainRequest) -> Result<TrainReply> {
        self.train_requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request.clone());
        wait_gate(&self.gate).await;
        pop(&self.trains, "train")
    }
}
