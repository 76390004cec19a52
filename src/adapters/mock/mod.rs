//! Mock adapters for tests and offline runs.

mod mock_channel;

pub use mock_channel::{MockDialogueChannel, MockReply};
