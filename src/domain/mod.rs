//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, tagged handles, timestamps, errors)
//! - `plot` - Plot field extraction, transcript and the stage session

pub mod foundation;
pub mod plot;
