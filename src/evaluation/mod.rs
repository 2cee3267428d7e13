//! Model evaluation: agreement with human scores and adversarial rejection
//!
//! - [`CrossValidator`] estimates quadratic weighted kappa by seeded k-fold
//! - [`compute_arr`] scores an adversarial corpus with a trained model
//! - [`ExcerptCollector`] derives review excerpts and band tallies from
//!   prediction logs

mod cross_validation;
mod excerpts;
mod kappa;
mod rejection;

pub use cross_validation::{
    CrossValidationReport, CrossValidator, Fold, DEFAULT_CV_SEED, DEFAULT_FOLDS,
};
pub use excerpts::{
    is_displayable, prompt_display_name, ExcerptCollector, ExcerptSample, PromptExcerpts,
    ScoreDistribution, ScoreTally, EXCERPTS_PER_BAND,
};
pub use kappa::quadratic_weighted_kappa;
pub use rejection::{compute_arr, rejection_rate, ArrOutcome};
