//! RBF-kernel support vector classifier
//!
//! Multi-class via one-vs-one voting over every pair of bands seen in
//! training. Each binary machine is solved with SMO using second-order
//! working-set selection (Fan, Chen & Lin 2005). Training is fully
//! deterministic: no random restarts, no shuffling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ArrError, ArrResult};
use crate::features::FeatureRow;
use crate::models::ScoreBand;

/// Curvature floor for non-PSD working pairs
const TAU: f64 = 1e-12;

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmParams {
    /// Box constraint
    pub c: f64,
    /// KKT violation tolerance for the stopping criterion
    pub tolerance: f64,
    /// Upper bound on SMO iterations per binary machine
    pub max_iter: usize,
    /// RBF width; `None` = 1 / (n_features * Var(X))
    pub gamma: Option<f64>,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 1e-3,
            max_iter: 10_000_000,
            gamma: None,
        }
    }
}

/// One pairwise machine: positive class is `pos`.
#[derive(Debug, Clone)]
struct BinaryMachine {
    pos: ScoreBand,
    neg: ScoreBand,
    /// (support row index, alpha * y)
    coef: Vec<(usize, f64)>,
    rho: f64,
}

/// Fitted kernel SVM.
#[derive(Debug, Clone)]
pub struct KernelSvm {
    gamma: f64,
    classes: Vec<ScoreBand>,
    support: Vec<FeatureRow>,
    support_norms: Vec<f64>,
    machines: Vec<BinaryMachine>,
}

impl KernelSvm {
    /// Fit on feature rows. `n_features` is the full column count.
    pub fn fit(
        rows: &[FeatureRow],
        labels: &[ScoreBand],
        n_features: usize,
        params: &SvmParams,
    ) -> ArrResult<Self> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(ArrError::InvalidInput(format!(
                "{} feature rows for {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let mut classes: Vec<ScoreBand> = labels.to_vec();
        classes.sort();
        classes.dedup();

        let gamma = params
            .gamma
            .unwrap_or_else(|| scale_gamma(rows, n_features));

        if classes.len() < 2 {
            debug!(class = %classes[0], "single band in training data, constant predictor");
            return Ok(Self {
                gamma,
                classes,
                support: Vec::new(),
                support_norms: Vec::new(),
                machines: Vec::new(),
            });
        }

        let gram = Gram::compute(rows, gamma);

        let mut machines = Vec::new();
        let mut used = vec![false; rows.len()];
        for (a, &pos) in classes.iter().enumerate() {
            for &neg in &classes[a + 1..] {
                let members: Vec<usize> = (0..rows.len())
                    .filter(|&i| labels[i] == pos || labels[i] == neg)
                    .collect();
                let y: Vec<f64> = members
                    .iter()
                    .map(|&i| if labels[i] == pos { 1.0 } else { -1.0 })
                    .collect();

                let (alpha, rho) = solve_smo(&gram, &members, &y, params);

                let coef: Vec<(usize, f64)> = members
                    .iter()
                    .zip(alpha.iter().zip(&y))
                    .filter(|(_, (a, _))| **a > 0.0)
                    .map(|(&i, (a, yi))| (i, a * yi))
                    .collect();
                for &(i, _) in &coef {
                    used[i] = true;
                }
                machines.push(BinaryMachine { pos, neg, coef, rho });
            }
        }

        // Compact support rows and remap machine indices
        let mut remap = vec![usize::MAX; rows.len()];
        let mut support = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if used[i] {
                remap[i] = support.len();
                support.push(row.clone());
            }
        }
        for machine in &mut machines {
            for entry in &mut machine.coef {
                entry.0 = remap[entry.0];
            }
        }
        let support_norms = support.iter().map(FeatureRow::squared_norm).collect();

        debug!(
            classes = classes.len(),
            machines = machines.len(),
            support_vectors = support.len(),
            gamma,
            "fitted kernel svm"
        );

        Ok(Self {
            gamma,
            classes,
            support,
            support_norms,
            machines,
        })
    }

    /// Bands seen during fit, ascending.
    pub fn classes(&self) -> &[ScoreBand] {
        &self.classes
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn support_vector_count(&self) -> usize {
        self.support.len()
    }

    pub fn predict_one(&self, row: &FeatureRow) -> ScoreBand {
        if self.machines.is_empty() {
            return self.classes[0];
        }

        let norm = row.squared_norm();
        let kernel: Vec<f64> = self
            .support
            .iter()
            .zip(&self.support_norms)
            .map(|(sv, sv_norm)| rbf(self.gamma, norm, *sv_norm, row.dot(sv)))
            .collect();

        let mut votes = [0usize; 4];
        for machine in &self.machines {
            let decision: f64 = machine
                .coef
                .iter()
                .map(|&(i, c)| c * kernel[i])
                .sum::<f64>()
                - machine.rho;
            let winner = if decision > 0.0 { machine.pos } else { machine.neg };
            votes[winner.index()] += 1;
        }

        // First maximum wins, i.e. ties go to the lower band
        let mut best = self.classes[0];
        for &band in &self.classes {
            if votes[band.index()] > votes[best.index()] {
                best = band;
            }
        }
        best
    }

    pub fn predict(&self, rows: &[FeatureRow]) -> Vec<ScoreBand> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }
}

fn rbf(gamma: f64, norm_a: f64, norm_b: f64, dot: f64) -> f64 {
    let dist = (norm_a + norm_b - 2.0 * dot).max(0.0);
    (-gamma * dist).exp()
}

/// gamma = 1 / (n_features * Var(X)) over the dense matrix, 1.0 if Var(X) = 0.
fn scale_gamma(rows: &[FeatureRow], n_features: usize) -> f64 {
    let cells = (rows.len() * n_features.max(1)) as f64;
    let (sum, sum_sq) = rows
        .iter()
        .flat_map(|r| r.entries().iter())
        .fold((0.0, 0.0), |(s, sq), (_, v)| (s + v, sq + v * v));
    let mean = sum / cells;
    let var = sum_sq / cells - mean * mean;
    if var > 0.0 {
        1.0 / (n_features.max(1) as f64 * var)
    } else {
        1.0
    }
}

/// Dense kernel matrix over the training rows.
struct Gram {
    n: usize,
    values: Vec<f64>,
}

impl Gram {
    fn compute(rows: &[FeatureRow], gamma: f64) -> Self {
        let n = rows.len();
        let norms: Vec<f64> = rows.iter().map(FeatureRow::squared_norm).collect();
        let values: Vec<f64> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let norms = &norms;
                (0..n).map(move |j| rbf(gamma, norms[i], norms[j], rows[i].dot(&rows[j])))
            })
            .collect();
        Self { n, values }
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }
}

/// Solve the C-SVC dual for the rows in `members`. Returns (alpha, rho).
fn solve_smo(gram: &Gram, members: &[usize], y: &[f64], params: &SvmParams) -> (Vec<f64>, f64) {
    let l = members.len();
    let c = params.c;
    let k = |a: usize, b: usize| gram.get(members[a], members[b]);
    let q = |a: usize, b: usize| y[a] * y[b] * k(a, b);

    let mut alpha = vec![0.0f64; l];
    let mut grad = vec![-1.0f64; l];

    let in_up = |t: usize, alpha: &[f64]| {
        (y[t] > 0.0 && alpha[t] < c) || (y[t] < 0.0 && alpha[t] > 0.0)
    };
    let in_low = |t: usize, alpha: &[f64]| {
        (y[t] > 0.0 && alpha[t] > 0.0) || (y[t] < 0.0 && alpha[t] < c)
    };

    let mut iter = 0usize;
    loop {
        if iter >= params.max_iter {
            warn!(iterations = iter, "SMO reached iteration limit before convergence");
            break;
        }
        iter += 1;

        // Working set selection: maximal violating i, second-order j
        let mut g_max = f64::NEG_INFINITY;
        let mut i_sel = None;
        for t in 0..l {
            if in_up(t, &alpha) && -y[t] * grad[t] >= g_max {
                g_max = -y[t] * grad[t];
                i_sel = Some(t);
            }
        }
        let Some(i) = i_sel else { break };

        let mut g_max2 = f64::NEG_INFINITY;
        let mut obj_min = f64::INFINITY;
        let mut j_sel = None;
        for t in 0..l {
            if !in_low(t, &alpha) {
                continue;
            }
            g_max2 = g_max2.max(y[t] * grad[t]);
            let b = g_max + y[t] * grad[t];
            if b > 0.0 {
                let mut a = k(i, i) + k(t, t) - 2.0 * k(i, t);
                if a <= 0.0 {
                    a = TAU;
                }
                let obj = -(b * b) / a;
                if obj <= obj_min {
                    obj_min = obj;
                    j_sel = Some(t);
                }
            }
        }

        let Some(j) = j_sel else { break };
        if g_max + g_max2 < params.tolerance {
            break;
        }

        let (old_i, old_j) = (alpha[i], alpha[j]);
        if y[i] != y[j] {
            let mut quad = k(i, i) + k(j, j) - 2.0 * k(i, j);
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;
            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = -diff;
            }
            if diff > 0.0 {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = c - diff;
                }
            } else if alpha[j] > c {
                alpha[j] = c;
                alpha[i] = c + diff;
            }
        } else {
            let mut quad = k(i, i) + k(j, j) - 2.0 * k(i, j);
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;
            if sum > c {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = sum - c;
                }
            } else if alpha[j] < 0.0 {
                alpha[j] = 0.0;
                alpha[i] = sum;
            }
            if sum > c {
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = sum - c;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = sum;
            }
        }

        let (d_i, d_j) = (alpha[i] - old_i, alpha[j] - old_j);
        for t in 0..l {
            grad[t] += q(i, t) * d_i + q(j, t) * d_j;
        }
    }

    // Bias from free vectors, or the midpoint of the feasible interval
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free_count = 0usize;
    for t in 0..l {
        let yg = y[t] * grad[t];
        if alpha[t] >= c {
            if y[t] < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if alpha[t] <= 0.0 {
            if y[t] > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            free_count += 1;
            free_sum += yg;
        }
    }
    let rho = if free_count > 0 {
        free_sum / free_count as f64
    } else {
        (upper + lower) / 2.0
    };

    (alpha, rho)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[f64]) -> FeatureRow {
        FeatureRow::new(values.iter().copied().enumerate().collect())
    }

    #[test]
    fn test_binary_separable() {
        let rows = vec![
            row(&[0.0, 0.0]),
            row(&[0.1, 0.0]),
            row(&[0.0, 0.1]),
            row(&[1.0, 1.0]),
            row(&[0.9, 1.0]),
            row(&[1.0, 0.9]),
        ];
        let labels = vec![
            ScoreBand::Zero,
            ScoreBand::Zero,
            ScoreBand::Zero,
            ScoreBand::Two,
            ScoreBand::Two,
            ScoreBand::Two,
        ];
        let params = SvmParams {
            gamma: Some(1.0),
            ..Default::default()
        };
        let svm = KernelSvm::fit(&rows, &labels, 2, &params).unwrap();

        assert_eq!(svm.classes(), &[ScoreBand::Zero, ScoreBand::Two]);
        assert_eq!(svm.predict(&rows), labels);
        assert_eq!(svm.predict_one(&row(&[0.05, 0.05])), ScoreBand::Zero);
        assert_eq!(svm.predict_one(&row(&[0.95, 0.95])), ScoreBand::Two);
    }

    #[test]
    fn test_multiclass_one_vs_one() {
        let centers = [(0.0, 0.0), (3.0, 0.0), (0.0, 3.0), (3.0, 3.0)];
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (band, (cx, cy)) in ScoreBand::ALL.iter().zip(centers) {
            for d in [-0.1, 0.0, 0.1] {
                rows.push(row(&[cx + d, cy - d]));
                labels.push(*band);
            }
        }
        let svm = KernelSvm::fit(&rows, &labels, 2, &SvmParams::default()).unwrap();
        assert_eq!(svm.classes().len(), 4);
        assert_eq!(svm.predict(&rows), labels);
    }

    #[test]
    fn test_single_class_is_constant() {
        let rows = vec![row(&[1.0]), row(&[2.0])];
        let labels = vec![ScoreBand::One, ScoreBand::One];
        let svm = KernelSvm::fit(&rows, &labels, 1, &SvmParams::default()).unwrap();
        assert_eq!(svm.predict_one(&row(&[100.0])), ScoreBand::One);
        assert_eq!(svm.support_vector_count(), 0);
    }

    #[test]
    fn test_only_trained_labels_emitted() {
        let rows = vec![row(&[0.0]), row(&[1.0]), row(&[5.0])];
        let labels = vec![ScoreBand::Zero, ScoreBand::Three, ScoreBand::Three];
        let svm = KernelSvm::fit(&rows, &labels, 1, &SvmParams::default()).unwrap();
        for x in [-10.0, 0.5, 2.0, 40.0] {
            let band = svm.predict_one(&row(&[x]));
            assert!(band == ScoreBand::Zero || band == ScoreBand::Three);
        }
    }

    #[test]
    fn test_scale_gamma() {
        // values {0, 2} over 2 cells: mean 1, var 1
        let rows = vec![row(&[0.0, 2.0])];
        assert!((scale_gamma(&rows, 2) - 0.5).abs() < 1e-12);
        assert_eq!(scale_gamma(&[FeatureRow::default()], 3), 1.0);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let rows = vec![row(&[0.0])];
        assert!(KernelSvm::fit(&rows, &[], 1, &SvmParams::default()).is_err());
    }
}
