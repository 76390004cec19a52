//! In-memory interaction log.
//!
//! Keeps every record in a `Mutex<Vec<_>>`. Useful for tests and for
//! running the binary without a store.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::foundation::SessionId;
use crate::ports::{InteractionLog, InteractionRecord, LogError};

/// In-memory implementation of the InteractionLog port.
#[derive(Debug, Default)]
pub struct InMemoryInteractionLog {
    records: Mutex<Vec<InteractionRecord>>,
}

impl InMemoryInteractionLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all records in arrival order.
    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Returns the records of one session.
    pub fn for_session(&self, session_id: SessionId) -> Vec<InteractionRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl InteractionLog for InMemoryInteractionLog {
    async fn record(&self, record: InteractionRecord) -> Result<(), LogError> {
        self.records
            .lock()
            .map_err(|_| LogError::Unavailable("interaction log lock poisoned".to_string()))?
            .push(record);
        Ok(())
    }
}
