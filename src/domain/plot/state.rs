//! Lifecycle of the plot extraction stage.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a session is in the plot stage.
///
/// - `AwaitingFirstPrompt`: nothing sent yet
/// - `Conversing`: waiting for the student
/// - `TurnInFlight`: channel calls outstanding, input disabled
/// - `StageComplete`: plot handed to the next stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionState {
    #[default]
    AwaitingFirstPrompt,
    Conversing,
    TurnInFlight,
    StageComplete,
}

impl ExtractionState {
    /// Returns true if the student may submit a turn.
    pub fn accepts_user_input(&self) -> bool {
        matches!(self, Self::Conversing)
    }

    /// Returns true once the opening exchange has happened.
    pub fn has_started(&self) -> bool {
        !matches!(self, Self::AwaitingFirstPrompt)
    }
}

impl StateMachine for ExtractionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ExtractionState::*;
        matches!(
            (self, target),
            (AwaitingFirstPrompt, Conversing)
                | (Conversing, TurnInFlight)
                // success or abort both land back in conversing
                | (TurnInFlight, Conversing)
                | (Conversing, StageComplete)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ExtractionState::*;
        match self {
            AwaitingFirstPrompt => vec![Conversing],
            Conversing => vec![TurnInFlight, StageComplete],
            TurnInFlight => vec![Conversing],
            StageComplete => vec![],
        }
    }
}
