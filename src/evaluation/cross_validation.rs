//! Seeded k-fold cross-validation scored by quadratic weighted kappa
//!
//! Indices are shuffled once with the validator's own seed, then cut into
//! `folds` contiguous partitions. The first `n % folds` partitions get one
//! extra item. Every fold trains a fresh model from the template's config.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::kappa::quadratic_weighted_kappa;
use crate::error::{ArrError, ArrResult};
use crate::models::{LabeledExample, ScoreBand};
use crate::scoring::ScoringModel;

pub const DEFAULT_FOLDS: usize = 10;
pub const DEFAULT_CV_SEED: u64 = 42;

/// Train/test index split for one fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Per-fold kappas plus their mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationReport {
    pub fold_kappas: Vec<f64>,
    pub mean_kappa: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CrossValidator {
    folds: usize,
    seed: u64,
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self::new(DEFAULT_FOLDS, DEFAULT_CV_SEED)
    }
}

impl CrossValidator {
    pub fn new(folds: usize, seed: u64) -> Self {
        Self { folds, seed }
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Partition `n` items. Same seed, same partition.
    pub fn split(&self, n: usize) -> ArrResult<Vec<Fold>> {
        if self.folds < 2 {
            return Err(ArrError::InvalidInput(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.folds
            )));
        }
        if n < self.folds {
            return Err(ArrError::InvalidInput(format!(
                "cannot split {} examples into {} folds",
                n, self.folds
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let base = n / self.folds;
        let extra = n % self.folds;
        let mut folds = Vec::with_capacity(self.folds);
        let mut start = 0;
        for f in 0..self.folds {
            let size = base + usize::from(f < extra);
            let test = indices[start..start + size].to_vec();
            let train = indices[..start]
                .iter()
                .chain(&indices[start + size..])
                .copied()
                .collect();
            folds.push(Fold { train, test });
            start += size;
        }
        Ok(folds)
    }

    /// Mean kappa across folds.
    pub fn evaluate(&self, template: &ScoringModel, examples: &[LabeledExample]) -> ArrResult<f64> {
        Ok(self.evaluate_detailed(template, examples)?.mean_kappa)
    }

    pub fn evaluate_detailed(
        &self,
        template: &ScoringModel,
        examples: &[LabeledExample],
    ) -> ArrResult<CrossValidationReport> {
        let folds = self.split(examples.len())?;

        let fold_kappas = folds
            .par_iter()
            .enumerate()
            .map(|(i, fold)| {
                let train: Vec<LabeledExample> =
                    fold.train.iter().map(|&j| examples[j].clone()).collect();
                let mut model = template.fresh();
                model.fit(&train)?;

                let texts: Vec<&str> = fold.test.iter().map(|&j| examples[j].text.as_str()).collect();
                let truth: Vec<ScoreBand> = fold.test.iter().map(|&j| examples[j].score).collect();
                let predicted = model.predict(&texts)?;
                let kappa = quadratic_weighted_kappa(&truth, &predicted)?;
                debug!(fold = i, test_size = truth.len(), kappa, "fold scored");
                Ok(kappa)
            })
            .collect::<ArrResult<Vec<f64>>>()?;

        let mean_kappa = fold_kappas.iter().sum::<f64>() / fold_kappas.len() as f64;
        let label = template.key().map(|k| k.label()).unwrap_or_default();
        info!(
            combination = label.as_str(),
            folds = fold_kappas.len(),
            mean_kappa,
            "cross-validated scoring model"
        );
        Ok(CrossValidationReport {
            fold_kappas,
            mean_kappa,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes_and_disjointness() {
        let folds = CrossValidator::new(4, 1).split(10).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), 10);
            assert!(fold.test.iter().all(|i| !fold.train.contains(i)));
        }
    }

    #[test]
    fn test_split_reproducible() {
        let a = CrossValidator::new(5, 42).split(23).unwrap();
        let b = CrossValidator::new(5, 42).split(23).unwrap();
        assert_eq!(a, b);
        let c = CrossValidator::new(5, 7).split(23).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_too_few_examples() {
        assert!(CrossValidator::default().split(9).is_err());
        assert!(CrossValidator::new(1, 0).split(9).is_err());
    }

    #[test]
    fn test_separable_data_high_kappa() {
        let answers = [
            (ScoreBand::Zero, "xx"),
            (ScoreBand::One, "apple tree"),
            (ScoreBand::Two, "river stone bridge"),
            (ScoreBand::Three, "quantum photon laser beam"),
        ];
        let examples: Vec<LabeledExample> = (0..40)
            .map(|i| {
                let (band, text) = answers[i % 4];
                LabeledExample::new(text, band)
            })
            .collect();

        let report = CrossValidator::default()
            .evaluate_detailed(&ScoringModel::default(), &examples)
            .unwrap();
        assert_eq!(report.fold_kappas.len(), 10);
        assert!(report.mean_kappa > 0.9, "kappa {}", report.mean_kappa);
        assert!(report
            .fold_kappas
            .iter()
            .all(|k| (-1.0..=1.0).contains(k)));
    }

    #[test]
    fn test_kappa_bounded_on_noise() {
        let words = ["alpha", "beta", "gamma", "delta", "omega"];
        let examples: Vec<LabeledExample> = (0..30)
            .map(|i| {
                let text = format!("{} {}", words[i % 5], words[(i * 3) % 5]);
                LabeledExample::new(text, ScoreBand::ALL[(i * 7) % 4])
            })
            .collect();
        let mean = CrossValidator::new(3, 9)
            .evaluate(&ScoringModel::default(), &examples)
            .unwrap();
        assert!((-1.0..=1.0).contains(&mean));
    }
}
