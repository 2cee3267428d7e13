//! Adversarial rejection rate

use serde::Serialize;
use tracing::info;

use super::excerpts::ScoreTally;
use crate::error::{ArrError, ArrResult};
use crate::models::{ScoreBand, ScoredBurst};
use crate::scoring::ScoringModel;

/// Predictions aligned with the adversarial inputs, plus their ARR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrOutcome {
    pub predictions: Vec<ScoredBurst>,
    pub arr: f64,
}

impl ArrOutcome {
    pub fn rejected(&self) -> usize {
        self.predictions
            .iter()
            .filter(|p| p.predicted == ScoreBand::Zero)
            .count()
    }

    pub fn tally(&self) -> ScoreTally {
        ScoreTally::from_bands(self.predictions.iter().map(|p| p.predicted))
    }
}

/// Fraction of predictions in the lowest band.
pub fn rejection_rate(predictions: &[ScoreBand]) -> ArrResult<f64> {
    if predictions.is_empty() {
        return Err(ArrError::EmptyAdversarialSet);
    }
    let rejected = predictions.iter().filter(|p| **p == ScoreBand::Zero).count();
    Ok(rejected as f64 / predictions.len() as f64)
}

/// Score every adversarial text with a trained model and compute ARR.
pub fn compute_arr<S: AsRef<str>>(model: &ScoringModel, texts: &[S]) -> ArrResult<ArrOutcome> {
    if texts.is_empty() {
        return Err(ArrError::EmptyAdversarialSet);
    }
    let refs: Vec<&str> = texts.iter().map(AsRef::as_ref).collect();
    let predicted = model.predict(&refs)?;
    let arr = rejection_rate(&predicted)?;

    let predictions = refs
        .iter()
        .zip(predicted)
        .map(|(text, predicted)| ScoredBurst {
            text: text.to_string(),
            predicted,
        })
        .collect();

    let label = model.key().map(|k| k.label()).unwrap_or_default();
    info!(
        combination = label.as_str(),
        samples = texts.len(),
        arr,
        "computed adversarial rejection rate"
    );
    Ok(ArrOutcome { predictions, arr })
}
