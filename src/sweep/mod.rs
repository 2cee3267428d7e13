//! Sweep over (language, prompt) combinations
//!
//! Combinations share nothing mutable, so they run as independent rayon
//! tasks. A failing combination becomes a [`CombinationOutcome::Failed`]
//! entry in the report and never aborts its siblings.

mod combination;

pub use combination::{
    generate_bursts, run_combination, tag_stem, CombinationPaths, CombinationResult,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info};

use crate::config::SweepConfig;
use crate::models::CombinationKey;

/// Result of one combination
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CombinationOutcome {
    Completed(CombinationResult),
    Failed {
        key: CombinationKey,
        /// Error kind, e.g. `EmptyVocabularyError`
        kind: String,
        message: String,
    },
}

impl CombinationOutcome {
    pub fn key(&self) -> &CombinationKey {
        match self {
            CombinationOutcome::Completed(result) => &result.key,
            CombinationOutcome::Failed { key, .. } => key,
        }
    }

    pub fn result(&self) -> Option<&CombinationResult> {
        match self {
            CombinationOutcome::Completed(result) => Some(result),
            CombinationOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CombinationOutcome::Failed { .. })
    }
}

/// Aggregate of a whole sweep, in configuration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub generated_at: DateTime<Utc>,
    pub method: String,
    pub outcomes: Vec<CombinationOutcome>,
}

impl SweepReport {
    pub fn completed(&self) -> impl Iterator<Item = &CombinationResult> {
        self.outcomes.iter().filter_map(CombinationOutcome::result)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// True when there was work to do and none of it succeeded
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.failed_count() == self.outcomes.len()
    }
}

/// Run one combination, folding any error into the outcome.
pub fn evaluate_combination(config: &SweepConfig, key: &CombinationKey) -> CombinationOutcome {
    match run_combination(config, key) {
        Ok(result) => CombinationOutcome::Completed(result),
        Err(e) => {
            error!(combination = %key, kind = e.kind(), "combination failed: {}", e);
            CombinationOutcome::Failed {
                key: key.clone(),
                kind: e.kind().to_string(),
                message: e.to_string(),
            }
        }
    }
}

fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ")
}

/// Run every configured combination on `workers` threads.
pub fn run_sweep(config: &SweepConfig, workers: usize, show_progress: bool) -> Result<SweepReport> {
    let combinations = config.combinations();
    info!(
        combinations = combinations.len(),
        workers, "starting sweep"
    );

    let bar = if show_progress {
        let bar = ProgressBar::new(combinations.len() as u64);
        bar.set_style(create_bar_style());
        bar.set_message("Evaluating combinations");
        bar
    } else {
        ProgressBar::hidden()
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()?;

    let outcomes: Vec<CombinationOutcome> = pool.install(|| {
        combinations
            .par_iter()
            .map(|key| {
                let outcome = evaluate_combination(config, key);
                bar.inc(1);
                outcome
            })
            .collect()
    });
    bar.finish_and_clear();

    let report = SweepReport {
        generated_at: Utc::now(),
        method: config.method.clone(),
        outcomes,
    };
    info!(
        completed = report.outcomes.len() - report.failed_count(),
        failed = report.failed_count(),
        "sweep finished"
    );
    Ok(report)
}
