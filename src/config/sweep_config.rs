//! Sweep configuration
//!
//! Lookup order for the config file, first hit wins:
//! 1. `--config <path>`
//! 2. `./burstarr.toml`
//! 3. `~/.config/burstarr/config.toml`
//!
//! No file means defaults. `BURSTARR_SEED` overrides the burst seed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::burst::{DEFAULT_BURST_AMOUNT, DEFAULT_MAX_REJECTIONS, DEFAULT_TARGET_LENGTH};
use crate::encoding::TextEncoding;
use crate::evaluation::{DEFAULT_CV_SEED, DEFAULT_FOLDS};
use crate::models::CombinationKey;
use crate::scoring::ScoringConfig;

pub const CONFIG_FILE_NAME: &str = "burstarr.toml";
pub const SEED_ENV_VAR: &str = "BURSTARR_SEED";

/// Directory layout, relative to the working directory unless absolute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Pre-tagged prompt documents, `Prompt<N>_<lang>.tsv`
    pub tags_dir: PathBuf,
    /// Human-scored answers, `ASAP_<lang>_prompt<N>.tsv`
    pub training_dir: PathBuf,
    pub burst_dir: PathBuf,
    pub predictions_dir: PathBuf,
    pub excerpt_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            tags_dir: PathBuf::from("results/prompt_tags"),
            training_dir: PathBuf::from("resources/data/monolingual_ASAP_data_with_scores"),
            burst_dir: PathBuf::from("results/burst_attack_txt"),
            predictions_dir: PathBuf::from("results/arr_sentences_results"),
            excerpt_dir: PathBuf::from("results/arr_sentence_result_excerpt"),
            report_dir: PathBuf::from("results/adversarial_rejection_rates"),
        }
    }
}

/// Text encoding of each input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub tags: TextEncoding,
    pub training: TextEncoding,
    pub adversarial: TextEncoding,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            tags: TextEncoding::Utf8,
            training: TextEncoding::Utf8,
            adversarial: TextEncoding::Latin1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Burst generator seed
    pub seed: u64,
    /// Fold shuffling seed
    pub cv_seed: u64,
    pub folds: usize,
    pub burst_amount: usize,
    pub target_length: usize,
    pub max_rejections: usize,
    /// Prefix of generated burst ids
    pub id_prefix: String,
    /// METHOD column of evaluation records
    pub method: String,
    pub languages: Vec<String>,
    pub prompts: Vec<u32>,
    pub paths: PathConfig,
    pub encodings: EncodingConfig,
    pub scoring: ScoringConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            cv_seed: DEFAULT_CV_SEED,
            folds: DEFAULT_FOLDS,
            burst_amount: DEFAULT_BURST_AMOUNT,
            target_length: DEFAULT_TARGET_LENGTH,
            max_rejections: DEFAULT_MAX_REJECTIONS,
            id_prefix: "10700".to_string(),
            method: "CONTENT_BURST".to_string(),
            languages: ["en", "en_orig300", "en_orig", "es", "fr", "de"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            prompts: vec![1, 2, 10],
            paths: PathConfig::default(),
            encodings: EncodingConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl SweepConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SweepConfig = toml::from_str(content).context("Invalid burstarr config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Per-user config location
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("burstarr").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.folds >= 2, "folds must be at least 2, got {}", self.folds);
        anyhow::ensure!(self.burst_amount > 0, "burst_amount must be positive");
        anyhow::ensure!(self.max_rejections > 0, "max_rejections must be positive");
        anyhow::ensure!(self.scoring.svm.c > 0.0, "scoring.svm.c must be positive");
        Ok(())
    }

    /// Apply environment overrides. Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var(SEED_ENV_VAR) {
            self.apply_seed_override(&raw);
        }
    }

    fn apply_seed_override(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(seed) => {
                debug!(seed, "burst seed from environment");
                self.seed = seed;
            }
            Err(_) => warn!(value = raw, "ignoring non-numeric {}", SEED_ENV_VAR),
        }
    }

    /// Every (language, prompt) pair, prompt-major.
    pub fn combinations(&self) -> Vec<CombinationKey> {
        self.prompts
            .iter()
            .flat_map(|&p| self.languages.iter().map(move |l| CombinationKey::new(l.as_str(), p)))
            .collect()
    }
}

/// Load config from the first file in lookup order, then apply env overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<SweepConfig> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => [Some(PathBuf::from(CONFIG_FILE_NAME)), SweepConfig::user_config_path()]
            .into_iter()
            .flatten()
            .find(|p| p.is_file()),
    };

    let mut config = match candidate {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            SweepConfig::from_file(&path)?
        }
        None => SweepConfig::default(),
    };
    config.apply_env();
    Ok(config)
}
