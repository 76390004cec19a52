//! Application layer - orchestration of domain operations over ports.
//!
//! The extraction controller sequences each plot session turn across the
//! guidance and summarizer channels.

mod extraction_controller;

pub use extraction_controller::{
    ExtractionController, TurnError, TurnOutcome, CONVERSATION_VARIABLE,
};
