//! Mock dialogue channel for testing.
//!
//! Provides a configurable implementation of the DialogueChannel port,
//! allowing controller tests to run without a chat backend.
//!
//! # Features
//!
//! - Queued replies, consumed in order
//! - Error injection for failure-path testing
//! - Simulated latency
//! - Call capture, including the handle each call carried
//!
//! # Example
//!
//! ```ignore
//! let guidance = MockDialogueChannel::<Guidance>::new()
//!     .with_reply("Where does it happen? forest park beach home school library");
//!
//! let reply = guidance.send(ChannelRequest::new("hi", participant)).await?;
//! assert_eq!(reply.handle.as_str(), "guidance-conv-1");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::{ChannelKind, ConversationHandle};
use crate::ports::{ChannelError, ChannelReply, ChannelRequest, DialogueChannel};

/// A configured mock outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this text.
    Text(String),
    /// Fail with this error.
    Error(ChannelError),
}

/// Mock dialogue channel of kind `C`.
///
/// Clones share their queue and call history.
#[derive(Debug, Clone)]
pub struct MockDialogueChannel<C: ChannelKind> {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    default_reply: String,
    delay: Duration,
    calls: Arc<Mutex<Vec<ChannelRequest<C>>>>,
    minted: Arc<AtomicUsize>,
}

impl<C: ChannelKind> Default for MockDialogueChannel<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ChannelKind> MockDialogueChannel<C> {
    /// Creates a mock that answers "Mock reply" until configured otherwise.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            default_reply: "Mock reply".to_string(),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            minted: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queues a successful reply.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(MockReply::Text(text.into()));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: ChannelError) -> Self {
        self.push(MockReply::Error(error));
        self
    }

    /// Sets the reply used once the queue is empty.
    pub fn with_default_reply(mut self, text: impl Into<String>) -> Self {
        self.default_reply = text.into();
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues an outcome on an existing mock.
    pub fn push(&self, reply: MockReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Returns the number of calls made to this channel.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<ChannelRequest<C>> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the most recent call.
    pub fn last_call(&self) -> Option<ChannelRequest<C>> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Number of conversations this mock has started.
    pub fn conversations_started(&self) -> usize {
        self.minted.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockReply::Text(self.default_reply.clone()))
    }

    fn mint_handle(&self) -> ConversationHandle<C> {
        let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
        ConversationHandle::new(format!("{}-conv-{}", C::NAME, n))
    }
}

#[async_trait]
impl<C: ChannelKind> DialogueChannel<C> for MockDialogueChannel<C> {
    async fn send(&self, request: ChannelRequest<C>) -> Result<ChannelReply<C>, ChannelError> {
        let existing = request.handle.clone();
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_reply() {
            MockReply::Text(text) => {
                let handle = existing.unwrap_or_else(|| self.mint_handle());
                Ok(ChannelReply::new(text, handle))
            }
            MockReply::Error(err) => Err(err),
        }
    }
}
