//! Scoring model: feature pipeline + kernel SVM
//!
//! A [`ScoringModel`] is keyed by its (language, prompt) combination and
//! trained exactly once per evaluation run. Cross-validation builds fresh
//! instances from the same [`ScoringConfig`] instead of refitting in place.

mod model;
mod svm;

pub use model::{FitSummary, ScoringConfig, ScoringModel};
pub use svm::{KernelSvm, SvmParams};
