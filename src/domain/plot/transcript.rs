//! The append-only record of a brainstorming dialogue.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The guidance agent.
    Agent,
    /// The student.
    User,
}

/// A single turn of the dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who said it.
    pub speaker: Speaker,
    /// Display text of the turn.
    pub text: String,
    /// Quick-reply hints offered with an agent turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    /// When the turn was recorded.
    pub at: Timestamp,
}

impl Turn {
    /// Creates a student turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            hints: Vec::new(),
            at: Timestamp::now(),
        }
    }

    /// Creates an agent turn with its hints.
    pub fn agent(text: impl Into<String>, hints: Vec<String>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
            hints,
            at: Timestamp::now(),
        }
    }

    /// Returns true if the student said this.
    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

/// Ordered sequence of turns; insertion order is the only order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if nothing has been said.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The student's turns, in order.
    pub fn user_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|t| t.is_user())
    }

    /// The most recent agent turn, if any.
    pub fn last_agent_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.speaker == Speaker::Agent)
    }

    /// Returns a copy extended by one exchange, leaving `self` untouched.
    pub fn with_exchange(&self, user: Turn, agent: Turn) -> Self {
        let mut turns = Vec::with_capacity(self.turns.len() + 2);
        turns.extend_from_slice(&self.turns);
        turns.push(user);
        turns.push(agent);
        Self { turns }
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}
