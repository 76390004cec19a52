//! Conversation handles tagged by the channel that minted them.
//!
//! The guidance and summarizer dialogues each keep their own server-side
//! context. A handle carries its channel as a type parameter, so handing a
//! guidance handle to the summarizer is a compile error rather than a
//! silently confused conversation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker trait for a dialogue channel.
pub trait ChannelKind: fmt::Debug + Copy + Eq + Hash + Send + Sync + 'static {
    /// Short name used in logs and error messages.
    const NAME: &'static str;
}

/// The user-facing guidance dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guidance {}

/// The background dialogue that summarizes the transcript into plot fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Summarizer {}

impl ChannelKind for Guidance {
    const NAME: &'static str = "guidance";
}

impl ChannelKind for Summarizer {
    const NAME: &'static str = "summarizer";
}

/// Opaque server-side conversation identifier for channel `C`.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHandle<C: ChannelKind> {
    id: String,
    #[serde(skip)]
    _channel: PhantomData<fn() -> C>,
}

impl<C: ChannelKind> ConversationHandle<C> {
    /// Wraps an identifier minted by the backend.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            _channel: PhantomData,
        }
    }

    /// Returns the raw identifier for the wire.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Name of the channel this handle belongs to.
    pub fn channel(&self) -> &'static str {
        C::NAME
    }
}

impl<C: ChannelKind> Clone for ConversationHandle<C> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<C: ChannelKind> PartialEq for ConversationHandle<C> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<C: ChannelKind> Eq for ConversationHandle<C> {}

impl<C: ChannelKind> Hash for ConversationHandle<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<C: ChannelKind> fmt::Debug for ConversationHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConversationHandle<{}>({})", C::NAME, self.id)
    }
}

impl<C: ChannelKind> fmt::Display for ConversationHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Handle of the guidance conversation.
pub type GuidanceHandle = ConversationHandle<Guidance>;

/// Handle of the summarizer conversation.
pub type SummarizerHandle = ConversationHandle<Summarizer>;
