//! Foundation module - Shared domain primitives.
//!
//! Identifiers, channel-tagged conversation handles, timestamps and the
//! error types that form the vocabulary of the plot brainstorming domain.

mod errors;
mod handles;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use handles::{
    ChannelKind, ConversationHandle, Guidance, GuidanceHandle, Summarizer, SummarizerHandle,
};
pub use ids::{ParticipantId, SessionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
