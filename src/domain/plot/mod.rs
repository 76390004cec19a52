//! Plot module - extraction of Setting, Conflict and Goal from a guided
//! brainstorming dialogue.
//!
//! # Components
//!
//! - [`HintExtractor`]: splits guidance replies into body and hint words
//! - [`Transcript`]: append-only dialogue record
//! - [`FieldExtractor`]: strategy merging summarizer output into a
//!   [`StructuredPlot`]
//! - [`PlotSession`]: the explicit per-session state the controller drives
//! - [`GateStatus`]: whether the stage may advance

mod character;
mod hints;
mod prompts;
mod reconciler;
mod session;
mod state;
mod structured;
mod transcript;

pub use character::CharacterProfile;
pub use hints::{HintExtractor, HintedReply, DEFAULT_HINT_COUNT, DEFAULT_SEPARATORS, DEFAULT_STRIPPED};
pub use prompts::{opening_prompt, SummaryPrompt, DEFAULT_GREETING};
pub use reconciler::{
    FieldExtractor, LabelledFieldReconciler, ReconcilerConfig, Reconciliation,
    DEFAULT_COMPLETION_MARKER, DEFAULT_MIN_DESCRIPTION_CHARS,
};
pub use session::{PlotSession, StageIncomplete};
pub(crate) use session::TurnCommit;
pub use state::ExtractionState;
pub use structured::{
    CompletedPlot, CompletionSignal, FieldValue, GateStatus, PlotField, StructuredPlot, UNKNOWN,
};
pub use transcript::{Speaker, Transcript, Turn};
