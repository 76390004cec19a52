//! Interaction Log Port - per-turn record of a brainstorming session.
//!
//! The controller hands each successful turn to the log in a detached
//! task. Implementations may fail; failures are logged and never reach
//! the student.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ParticipantId, SessionId, Timestamp};
use crate::domain::plot::{StructuredPlot, Transcript};

/// Stage name written with every plot record.
pub const PLOT_STAGE: &str = "plot";

/// Port for persisting interaction records.
#[async_trait]
pub trait InteractionLog: Send + Sync {
    /// Stores one record.
    async fn record(&self, record: InteractionRecord) -> Result<(), LogError>;
}

/// Snapshot of a session after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub session_id: SessionId,
    pub participant: ParticipantId,
    pub stage: String,
    pub messages: Transcript,
    pub plot: StructuredPlot,
    pub at: Timestamp,
}

impl InteractionRecord {
    /// Creates a plot-stage record stamped now.
    pub fn plot_stage(
        session_id: SessionId,
        participant: ParticipantId,
        messages: Transcript,
        plot: StructuredPlot,
    ) -> Self {
        Self {
            session_id,
            participant,
            stage: PLOT_STAGE.to_string(),
            messages,
            plot,
            at: Timestamp::now(),
        }
    }
}

/// Interaction log errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    /// The store could not be reached.
    #[error("interaction log unavailable: {0}")]
    Unavailable(String),

    /// The record could not be encoded.
    #[error("failed to serialize interaction record: {0}")]
    Serialization(String),
}
