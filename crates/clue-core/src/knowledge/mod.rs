//! Per-agent deduction state over card ownership.
//!
//! This module is composed of:
//! - `tristate`: the explicit True/False/Unknown cell value.
//! - `base`: the belief matrix, its fixpoint propagation and derived probabilities.
//! - `snapshot`: serializable views of the envelope distribution for telemetry.

mod base;
mod snapshot;
mod tristate;

pub use base::{KnowledgeBase, KnowledgeError};
pub use snapshot::{CandidateProbability, CategorySnapshot, ProbabilitySnapshot};
pub use tristate::TriState;
