//! Text → score band classifier

use serde::{Deserialize, Serialize};
use tracing::info;

use super::svm::{KernelSvm, SvmParams};
use crate::error::{ArrError, ArrResult};
use crate::features::{FeaturePipeline, DEFAULT_MAX_FEATURES};
use crate::models::{CombinationKey, LabeledExample, ScoreBand};

/// Hyperparameters of a scoring model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Vocabulary cap for each n-gram vectorizer
    pub max_features: usize,
    pub svm: SvmParams,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            svm: SvmParams::default(),
        }
    }
}

/// What a fit produced, for logging and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    pub examples: usize,
    pub n_features: usize,
    pub classes: Vec<ScoreBand>,
    pub support_vectors: usize,
}

#[derive(Debug, Clone)]
pub struct ScoringModel {
    key: Option<CombinationKey>,
    config: ScoringConfig,
    pipeline: FeaturePipeline,
    classifier: Option<KernelSvm>,
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl ScoringModel {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            key: None,
            config,
            pipeline: FeaturePipeline::new().with_max_features(config.max_features),
            classifier: None,
        }
    }

    /// Model owned by one (language, prompt) combination.
    pub fn for_combination(key: CombinationKey, config: ScoringConfig) -> Self {
        Self {
            key: Some(key),
            ..Self::new(config)
        }
    }

    pub fn key(&self) -> Option<&CombinationKey> {
        self.key.as_ref()
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.classifier.is_some()
    }

    /// Bands the classifier can emit, empty before fit.
    pub fn classes(&self) -> &[ScoreBand] {
        self.classifier
            .as_ref()
            .map(KernelSvm::classes)
            .unwrap_or(&[])
    }

    /// Untrained copy with the same key and hyperparameters.
    pub fn fresh(&self) -> Self {
        match &self.key {
            Some(key) => Self::for_combination(key.clone(), self.config),
            None => Self::new(self.config),
        }
    }

    /// Learn vocabulary and decision boundary. Replaces any previous fit.
    pub fn fit(&mut self, examples: &[LabeledExample]) -> ArrResult<FitSummary> {
        self.classifier = None;
        if examples.is_empty() {
            return Err(ArrError::FeatureFit("no training examples".into()));
        }

        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let labels: Vec<ScoreBand> = examples.iter().map(|e| e.score).collect();

        let mut pipeline = FeaturePipeline::new().with_max_features(self.config.max_features);
        let rows = pipeline.fit_transform(&texts)?;
        let classifier = KernelSvm::fit(&rows, &labels, pipeline.n_features(), &self.config.svm)?;

        let summary = FitSummary {
            examples: examples.len(),
            n_features: pipeline.n_features(),
            classes: classifier.classes().to_vec(),
            support_vectors: classifier.support_vector_count(),
        };
        let label = self.key.as_ref().map(|k| k.label()).unwrap_or_default();
        info!(
            combination = label.as_str(),
            examples = summary.examples,
            features = summary.n_features,
            support_vectors = summary.support_vectors,
            "fitted scoring model"
        );

        self.pipeline = pipeline;
        self.classifier = Some(classifier);
        Ok(summary)
    }

    /// Predict one band per text, in input order.
    pub fn predict(&self, texts: &[&str]) -> ArrResult<Vec<ScoreBand>> {
        let classifier = self.classifier.as_ref().ok_or(ArrError::NotFitted)?;
        let rows = self.pipeline.transform(texts)?;
        Ok(classifier.predict(&rows))
    }
}
