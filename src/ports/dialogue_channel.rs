//! Dialogue Channel Port - Interface to an external conversational agent.
//!
//! A channel forwards one utterance to a server-side conversation and
//! returns the agent's reply together with the handle of that
//! conversation. The first call passes no handle; every later call reuses
//! the handle returned before.
//!
//! # Design
//!
//! - Channels are tagged by [`ChannelKind`], so a guidance handle can never
//!   be sent to the summarizer channel
//! - Failures are always surfaced as [`ChannelError`], never swallowed
//! - Free-form input variables travel alongside the utterance
//!
//! # Example
//!
//! ```ignore
//! let reply = guidance
//!     .send(ChannelRequest::new("a castle", participant).with_handle(handle))
//!     .await?;
//! session_handle = reply.handle;
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::foundation::{ChannelKind, ConversationHandle, ParticipantId};

/// Port for one conversational agent.
#[async_trait]
pub trait DialogueChannel<C: ChannelKind>: Send + Sync {
    /// Sends an utterance and waits for the complete reply.
    async fn send(&self, request: ChannelRequest<C>) -> Result<ChannelReply<C>, ChannelError>;
}

/// One utterance addressed to a channel.
#[derive(Debug, Clone)]
pub struct ChannelRequest<C: ChannelKind> {
    /// What the agent is asked.
    pub utterance: String,
    /// Conversation to continue; `None` starts a new one.
    pub handle: Option<ConversationHandle<C>>,
    /// Who is speaking.
    pub participant: ParticipantId,
    /// Named input variables understood by the agent.
    pub variables: BTreeMap<String, String>,
}

impl<C: ChannelKind> ChannelRequest<C> {
    /// Creates a request that starts a new conversation.
    pub fn new(utterance: impl Into<String>, participant: ParticipantId) -> Self {
        Self {
            utterance: utterance.into(),
            handle: None,
            participant,
            variables: BTreeMap::new(),
        }
    }

    /// Continues an existing conversation when a handle is known.
    pub fn with_handle(mut self, handle: Option<ConversationHandle<C>>) -> Self {
        self.handle = handle;
        self
    }

    /// Adds an input variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// The agent's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReply<C: ChannelKind> {
    /// Reply text, possibly empty.
    pub reply: String,
    /// Conversation the reply belongs to.
    pub handle: ConversationHandle<C>,
}

impl<C: ChannelKind> ChannelReply<C> {
    pub fn new(reply: impl Into<String>, handle: ConversationHandle<C>) -> Self {
        Self {
            reply: reply.into(),
            handle,
        }
    }
}

/// Dialogue channel errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Backend answered with a server error.
    #[error("channel unavailable: {message}")]
    Unavailable {
        /// Backend message.
        message: String,
    },

    /// Request never reached the backend.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Rate limited by the backend.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u64,
    },

    /// Credentials rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Backend rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reply did not have the expected shape.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

impl ChannelError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Creates a malformed reply error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedReply(message.into())
    }

    /// Returns true if the same request may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChannelError::Unavailable { .. }
                | ChannelError::Network(_)
                | ChannelError::Timeout { .. }
                | ChannelError::RateLimited { .. }
        )
    }

    /// Returns true if the backend answered but the answer was unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ChannelError::MalformedReply(_))
    }
}
