//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DialogueChannel` - One conversational agent, tagged by channel kind
//! - `InteractionLog` - Fire-and-forget per-turn session records

mod dialogue_channel;
mod interaction_log;

pub use dialogue_channel::{ChannelError, ChannelReply, ChannelRequest, DialogueChannel};
pub use interaction_log::{InteractionLog, InteractionRecord, LogError, PLOT_STAGE};
