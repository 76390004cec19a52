//! Interaction log adapters.

mod in_memory;
mod tracing_log;

pub use in_memory::InMemoryInteractionLog;
pub use tracing_log::TracingInteractionLog;
