//! ExtractionController - sequences the plot brainstorming dialogue.
//!
//! Each student turn runs the guidance channel, appends the exchange,
//! sends the whole transcript to the summarizer channel and merges the
//! summary into the structured plot. The session is committed only after
//! both calls succeed; any failure leaves it as it was before the turn.
//!
//! # Example
//!
//! ```ignore
//! let controller = ExtractionController::new(guidance, summarizer, extractor)
//!     .with_interaction_log(log);
//!
//! let mut session = PlotSession::new(participant).with_character(character);
//! let opening = controller.start(&mut session).await?;
//! let outcome = controller.submit_turn(&mut session, "in a magic forest").await?;
//! if outcome.gate.is_open() {
//!     let plot = controller.complete_stage(&mut session)?;
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::{ChannelKind, Guidance, Summarizer};
use crate::domain::plot::{
    opening_prompt, CompletedPlot, ExtractionState, FieldExtractor, GateStatus, HintExtractor,
    PlotField, PlotSession, StageIncomplete, StructuredPlot, SummaryPrompt, Turn, TurnCommit,
    DEFAULT_GREETING,
};
use crate::ports::{
    ChannelError, ChannelRequest, DialogueChannel, InteractionLog, InteractionRecord,
};

/// Input variable carrying the rendered transcript to the summarizer.
pub const CONVERSATION_VARIABLE: &str = "conversation";

/// Why a turn was not applied.
///
/// None of these are fatal: the session is unchanged and accepts the next
/// turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// A channel could not be reached or failed.
    #[error("{channel} channel unavailable: {source}")]
    ChannelUnavailable {
        channel: &'static str,
        source: ChannelError,
    },

    /// A channel answered with something unusable.
    #[error("{channel} channel returned a malformed reply: {source}")]
    MalformedReply {
        channel: &'static str,
        source: ChannelError,
    },

    /// Another turn has not finished yet.
    #[error("a turn is already in flight")]
    TurnInFlight,

    /// The session is not accepting turns.
    #[error("cannot accept a turn while {0:?}")]
    InvalidState(ExtractionState),

    /// Nothing but whitespace was submitted.
    #[error("utterance is empty")]
    EmptyUtterance,

    /// The chosen hint does not exist.
    #[error("no hint at index {index} ({available} available)")]
    NoSuchHint { index: usize, available: usize },
}

impl TurnError {
    fn from_channel<C: ChannelKind>(source: ChannelError) -> Self {
        if source.is_malformed() {
            TurnError::MalformedReply {
                channel: C::NAME,
                source,
            }
        } else {
            TurnError::ChannelUnavailable {
                channel: C::NAME,
                source,
            }
        }
    }
}

/// What a successful turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The agent turn as appended to the transcript.
    pub agent_turn: Turn,
    /// Fields that received a new concrete value this turn.
    pub updated: Vec<PlotField>,
    /// Plot after the turn.
    pub plot: StructuredPlot,
    /// Gate verdict after the turn.
    pub gate: GateStatus,
}

/// Re-enables input if a turn ends without a commit, including when
/// the turn future is dropped.
struct InFlightTurn<'a> {
    session: &'a mut PlotSession,
}

impl Drop for InFlightTurn<'_> {
    fn drop(&mut self) {
        self.session.abort_turn();
    }
}

/// Drives plot sessions against the two dialogue channels.
pub struct ExtractionController {
    guidance: Arc<dyn DialogueChannel<Guidance>>,
    summarizer: Arc<dyn DialogueChannel<Summarizer>>,
    extractor: Arc<dyn FieldExtractor>,
    hints: HintExtractor,
    summary_prompt: SummaryPrompt,
    greeting: String,
    interaction_log: Option<Arc<dyn InteractionLog>>,
}

impl ExtractionController {
    /// Creates a controller with default hint, prompt and greeting settings.
    pub fn new(
        guidance: Arc<dyn DialogueChannel<Guidance>>,
        summarizer: Arc<dyn DialogueChannel<Summarizer>>,
        extractor: Arc<dyn FieldExtractor>,
    ) -> Self {
        Self {
            guidance,
            summarizer,
            extractor,
            hints: HintExtractor::default(),
            summary_prompt: SummaryPrompt::default(),
            greeting: DEFAULT_GREETING.to_string(),
            interaction_log: None,
        }
    }

    pub fn with_hint_extractor(mut self, hints: HintExtractor) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_summary_prompt(mut self, prompt: SummaryPrompt) -> Self {
        self.summary_prompt = prompt;
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Sends a record of every successful turn to `log`.
    pub fn with_interaction_log(mut self, log: Arc<dyn InteractionLog>) -> Self {
        self.interaction_log = Some(log);
        self
    }

    /// Issues the opening exchange.
    ///
    /// The opening is never sent to the summarizer. Starting a session
    /// that already started returns its first agent turn without calling
    /// any channel.
    pub async fn start(&self, session: &mut PlotSession) -> Result<Turn, TurnError> {
        if session.state().has_started() {
            tracing::debug!(session_id = %session.id(), "session already started");
            return session
                .transcript()
                .turns()
                .first()
                .cloned()
                .ok_or(TurnError::InvalidState(session.state()));
        }

        let request = ChannelRequest::new(
            opening_prompt(session.character()),
            session.participant().clone(),
        );
        let reply = self
            .guidance
            .send(request)
            .await
            .map_err(TurnError::from_channel::<Guidance>)?;

        let agent_turn = if reply.reply.trim().is_empty() {
            Turn::agent(self.greeting.clone(), Vec::new())
        } else {
            self.agent_turn(&reply.reply)
        };

        session
            .commit_opening(agent_turn.clone(), reply.handle)
            .map_err(|_| TurnError::InvalidState(session.state()))?;

        tracing::info!(
            session_id = %session.id(),
            participant = %session.participant(),
            hints = agent_turn.hints.len(),
            "plot stage started"
        );
        Ok(agent_turn)
    }

    /// Runs one student turn.
    pub async fn submit_turn(
        &self,
        session: &mut PlotSession,
        utterance: &str,
    ) -> Result<TurnOutcome, TurnError> {
        match session.state() {
            ExtractionState::Conversing => {}
            ExtractionState::TurnInFlight => return Err(TurnError::TurnInFlight),
            other => return Err(TurnError::InvalidState(other)),
        }
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(TurnError::EmptyUtterance);
        }

        session
            .begin_turn()
            .map_err(|_| TurnError::InvalidState(session.state()))?;
        let mut turn = InFlightTurn { session };

        let result = self.run_turn(&mut *turn.session, utterance).await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "turn aborted");
        }
        result
    }

    /// Submits the hint at `index` of the latest agent turn.
    pub async fn submit_hint(
        &self,
        session: &mut PlotSession,
        index: usize,
    ) -> Result<TurnOutcome, TurnError> {
        let hints = session.current_hints();
        let hint = hints.get(index).ok_or(TurnError::NoSuchHint {
            index,
            available: hints.len(),
        })?;
        let utterance = self.hints.clean(hint);
        self.submit_turn(session, &utterance).await
    }

    /// Hands off the plot if the gate is open.
    pub fn complete_stage(&self, session: &mut PlotSession) -> Result<CompletedPlot, StageIncomplete> {
        let completed = session.complete()?;
        tracing::info!(
            session_id = %session.id(),
            setting = %completed.setting,
            "plot stage complete"
        );
        Ok(completed)
    }

    /// Discards the dialogue and extracted state so the stage starts over.
    pub fn reset(&self, session: &mut PlotSession) {
        session.reset();
        tracing::info!(session_id = %session.id(), "plot session reset");
    }

    async fn run_turn(
        &self,
        session: &mut PlotSession,
        utterance: &str,
    ) -> Result<TurnOutcome, TurnError> {
        let participant = session.participant().clone();

        let guidance_request = ChannelRequest::new(utterance, participant.clone())
            .with_handle(session.guidance_handle().cloned());
        let guidance_reply = self
            .guidance
            .send(guidance_request)
            .await
            .map_err(TurnError::from_channel::<Guidance>)?;

        let agent_turn = self.agent_turn(&guidance_reply.reply);
        let transcript = session
            .transcript()
            .with_exchange(Turn::user(utterance), agent_turn.clone());

        let rendered = self.summary_prompt.render_transcript(&transcript);
        let summary_request = ChannelRequest::new(self.summary_prompt.query(&rendered), participant)
            .with_handle(session.summarizer_handle().cloned())
            .with_variable(CONVERSATION_VARIABLE, rendered);
        let summary = self
            .summarizer
            .send(summary_request)
            .await
            .map_err(TurnError::from_channel::<Summarizer>)?;

        let reconciliation = self.extractor.extract_fields(&summary.reply, session.plot());
        let updated = reconciliation.updated.clone();

        tracing::debug!(
            session_id = %session.id(),
            updated = ?updated,
            marker = reconciliation.completion_marker_seen,
            "summary reconciled"
        );

        session
            .commit_turn(TurnCommit {
                transcript,
                guidance_handle: guidance_reply.handle,
                summarizer_handle: summary.handle,
                reconciliation,
            })
            .map_err(|_| TurnError::InvalidState(session.state()))?;

        self.record_interaction(session);

        Ok(TurnOutcome {
            agent_turn,
            updated,
            plot: session.plot().clone(),
            gate: session.gate_status(),
        })
    }

    fn agent_turn(&self, reply: &str) -> Turn {
        let hinted = self.hints.split(reply);
        let text = hinted.display_text(reply).to_string();
        Turn::agent(text, hinted.hints)
    }

    /// Fire-and-forget: the turn never waits for or fails on the log.
    fn record_interaction(&self, session: &PlotSession) {
        let Some(log) = self.interaction_log.clone() else {
            return;
        };
        let record = InteractionRecord::plot_stage(
            session.id(),
            session.participant().clone(),
            session.transcript().clone(),
            session.plot().clone(),
        );
        tokio::spawn(async move {
            if let Err(err) = log.record(record).await {
                tracing::warn!(error = %err, "failed to record interaction");
            }
        });
    }
}
