//! PlotSession - the explicit state of one brainstorming stage.

use crate::domain::foundation::{
    GuidanceHandle, ParticipantId, SessionId, StateMachine, SummarizerHandle, Timestamp,
    ValidationError,
};

use super::character::CharacterProfile;
use super::reconciler::Reconciliation;
use super::state::ExtractionState;
use super::structured::{CompletedPlot, CompletionSignal, GateStatus, PlotField, StructuredPlot};
use super::transcript::{Transcript, Turn};

/// Why the stage could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageIncomplete {
    /// The summarizer has not raised the completion signal yet.
    #[error("summary pending: the plot has not been confirmed yet")]
    SummaryPending,

    /// Some fields are still unset or unknown.
    #[error("fields incomplete: {}", format_fields(.0))]
    FieldsIncomplete(Vec<PlotField>),

    /// The session is not in a state that can complete.
    #[error("cannot complete the stage while {0:?}")]
    InvalidState(ExtractionState),
}

fn format_fields(fields: &[PlotField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything a successful turn changes, applied in one step.
#[derive(Debug, Clone)]
pub(crate) struct TurnCommit {
    pub transcript: Transcript,
    pub guidance_handle: GuidanceHandle,
    pub summarizer_handle: SummarizerHandle,
    pub reconciliation: Reconciliation,
}

/// State of the plot stage for one participant.
///
/// The session is passed by reference into the controller. Only the
/// controller mutates it, and only by whole-turn commits, so a failed
/// turn leaves it untouched apart from re-enabling input.
#[derive(Debug, Clone)]
pub struct PlotSession {
    id: SessionId,
    participant: ParticipantId,
    character: Option<CharacterProfile>,
    state: ExtractionState,
    transcript: Transcript,
    plot: StructuredPlot,
    completion: CompletionSignal,
    guidance_handle: Option<GuidanceHandle>,
    summarizer_handle: Option<SummarizerHandle>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl PlotSession {
    /// Creates a fresh session awaiting its opening prompt.
    pub fn new(participant: ParticipantId) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            participant,
            character: None,
            state: ExtractionState::default(),
            transcript: Transcript::new(),
            plot: StructuredPlot::new(),
            completion: CompletionSignal::default(),
            guidance_handle: None,
            summarizer_handle: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the character created in the previous stage.
    pub fn with_character(mut self, character: CharacterProfile) -> Self {
        self.character = Some(character);
        self
    }

    // === Accessors ===

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn character(&self) -> Option<&CharacterProfile> {
        self.character.as_ref()
    }

    pub fn state(&self) -> ExtractionState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn plot(&self) -> &StructuredPlot {
        &self.plot
    }

    pub fn completion(&self) -> CompletionSignal {
        self.completion
    }

    pub fn guidance_handle(&self) -> Option<&GuidanceHandle> {
        self.guidance_handle.as_ref()
    }

    pub fn summarizer_handle(&self) -> Option<&SummarizerHandle> {
        self.summarizer_handle.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Current verdict of the completion gate.
    pub fn gate_status(&self) -> GateStatus {
        GateStatus::evaluate(&self.plot, self.completion)
    }

    /// Hints offered with the latest agent turn.
    pub fn current_hints(&self) -> &[String] {
        self.transcript
            .last_agent_turn()
            .map(|t| t.hints.as_slice())
            .unwrap_or(&[])
    }

    /// Discards the dialogue, both handles and all extracted state.
    ///
    /// Identity, participant and character are kept.
    pub fn reset(&mut self) {
        self.state = ExtractionState::default();
        self.transcript = Transcript::new();
        self.plot = StructuredPlot::new();
        self.completion = CompletionSignal::default();
        self.guidance_handle = None;
        self.summarizer_handle = None;
        self.touch();
    }

    // === Controller mutations ===

    pub(crate) fn commit_opening(
        &mut self,
        agent_turn: Turn,
        handle: GuidanceHandle,
    ) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(ExtractionState::Conversing)?;
        self.transcript.push(agent_turn);
        self.guidance_handle = Some(handle);
        self.touch();
        Ok(())
    }

    pub(crate) fn begin_turn(&mut self) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(ExtractionState::TurnInFlight)?;
        Ok(())
    }

    pub(crate) fn abort_turn(&mut self) {
        if self.state == ExtractionState::TurnInFlight {
            self.state = ExtractionState::Conversing;
        }
    }

    pub(crate) fn commit_turn(&mut self, commit: TurnCommit) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(ExtractionState::Conversing)?;
        self.transcript = commit.transcript;
        self.guidance_handle = Some(commit.guidance_handle);
        self.summarizer_handle = Some(commit.summarizer_handle);
        self.plot = commit.reconciliation.plot;
        if commit.reconciliation.completion_marker_seen {
            self.completion.raise();
        }
        self.touch();
        Ok(())
    }

    /// Closes the stage if the gate is open.
    ///
    /// Completing an already completed stage returns the same plot.
    pub(crate) fn complete(&mut self) -> Result<CompletedPlot, StageIncomplete> {
        match self.state {
            ExtractionState::Conversing | ExtractionState::StageComplete => {}
            other => return Err(StageIncomplete::InvalidState(other)),
        }

        match self.gate_status() {
            GateStatus::Open => {}
            GateStatus::SummaryPending => return Err(StageIncomplete::SummaryPending),
            GateStatus::FieldsIncomplete(fields) => {
                return Err(StageIncomplete::FieldsIncomplete(fields))
            }
        }

        let completed = self
            .plot
            .to_completed()
            .ok_or_else(|| StageIncomplete::FieldsIncomplete(self.plot.missing_fields()))?;

        if self.state != ExtractionState::StageComplete {
            self.state = ExtractionState::StageComplete;
            self.touch();
        }
        Ok(completed)
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
