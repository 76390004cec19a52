//! Plot Brainstorm - guided plot brainstorming for young writers.
//!
//! A guidance agent leads the student through a conversation while a second
//! summarizer agent reads the whole transcript after every turn. Setting,
//! conflict and goal are extracted from the summaries, merged without ever
//! losing a confirmed value, and the stage completes only once all three are
//! concrete and the summarizer has said it is done.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
