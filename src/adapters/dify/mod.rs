//! Dify adapter - dialogue channels served by Dify chat applications.

mod channel;
mod config;
mod wire;

pub use channel::DifyChannel;
pub use config::{DifyChannelConfig, DEFAULT_BASE_URL};
