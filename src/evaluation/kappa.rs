//! Quadratic weighted kappa
//!
//! Cohen's kappa with quadratic disagreement weights. The label axis is
//! the sorted union of bands present in either sequence, and weights are
//! squared distances between positions on that axis.

use crate::error::{ArrError, ArrResult};
use crate::models::ScoreBand;

pub fn quadratic_weighted_kappa(truth: &[ScoreBand], predicted: &[ScoreBand]) -> ArrResult<f64> {
    if truth.len() != predicted.len() {
        return Err(ArrError::InvalidInput(format!(
            "kappa over {} true and {} predicted labels",
            truth.len(),
            predicted.len()
        )));
    }
    if truth.is_empty() {
        return Err(ArrError::InvalidInput("kappa over empty label sequences".into()));
    }

    let mut labels: Vec<ScoreBand> = truth.iter().chain(predicted).copied().collect();
    labels.sort();
    labels.dedup();
    let k = labels.len();
    let mut position = [0usize; 4];
    for (i, band) in labels.iter().enumerate() {
        position[band.index()] = i;
    }

    let mut observed = vec![vec![0.0f64; k]; k];
    for (t, p) in truth.iter().zip(predicted) {
        observed[position[t.index()]][position[p.index()]] += 1.0;
    }

    let n = truth.len() as f64;
    let row_totals: Vec<f64> = observed.iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..k).map(|j| observed.iter().map(|row| row[j]).sum()).collect();

    let mut observed_disagreement = 0.0;
    let mut expected_disagreement = 0.0;
    for i in 0..k {
        for j in 0..k {
            let weight = ((i as f64) - (j as f64)).powi(2);
            observed_disagreement += weight * observed[i][j];
            expected_disagreement += weight * row_totals[i] * col_totals[j] / n;
        }
    }

    if expected_disagreement == 0.0 {
        return Ok(if observed_disagreement == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - observed_disagreement / expected_disagreement)
}
