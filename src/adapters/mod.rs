//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `dify` - Dialogue channels served by Dify chat applications
//! - `interaction_log` - Interaction log sinks (in-memory, tracing)
//! - `mock` - Scriptable dialogue channel for tests

pub mod dify;
pub mod interaction_log;
pub mod mock;

pub use dify::{DifyChannel, DifyChannelConfig};
pub use interaction_log::{InMemoryInteractionLog, TracingInteractionLog};
pub use mock::{MockDialogueChannel, MockReply};
