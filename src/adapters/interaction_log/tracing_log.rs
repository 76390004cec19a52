//! Interaction log that writes records as structured tracing events.

use async_trait::async_trait;

use crate::ports::{InteractionLog, InteractionRecord, LogError};

/// Emits each record as one JSON-encoded `info` event on the
/// `interaction_log` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInteractionLog;

impl TracingInteractionLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InteractionLog for TracingInteractionLog {
    async fn record(&self, record: InteractionRecord) -> Result<(), LogError> {
        let messages = serde_json::to_string(&record.messages)
            .map_err(|e| LogError::Serialization(e.to_string()))?;
        let plot = serde_json::to_string(&record.plot)
            .map_err(|e| LogError::Serialization(e.to_string()))?;

        tracing::info!(
            target: "interaction_log",
            session_id = %record.session_id,
            participant = %record.participant,
            stage = %record.stage,
            at = %record.at,
            messages = %messages,
            plot = %plot,
            "interaction recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ParticipantId, SessionId};
    use crate::domain::plot::{StructuredPlot, Transcript};

    #[tokio::test]
    async fn recording_succeeds_without_subscriber() {
        let log = TracingInteractionLog::new();
        let record = InteractionRecord::plot_stage(
            SessionId::new(),
            ParticipantId::anonymous(),
            Transcript::new(),
            StructuredPlot::new(),
        );
        assert!(log.record(record).await.is_ok());
    }
}
