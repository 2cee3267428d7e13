//! One (language, prompt) evaluation run
//!
//! Stages, strictly in order:
//! tags → noun table → bursts → corpus file → training rows → cross-validation
//! → final fit → ARR over the corpus → prediction log → record.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::burst::{BurstGenerator, NounFrequencyTable};
use crate::config::SweepConfig;
use crate::error::ArrResult;
use crate::evaluation::{compute_arr, CrossValidator, ScoreTally};
use crate::io::{
    burst_file_name, prediction_log_name, read_adversarial_file, read_training_file,
    training_file_name, write_burst_corpus, write_prediction_log,
};
use crate::models::{ArrRecord, CombinationKey};
use crate::scoring::{FitSummary, ScoringModel};
use crate::tagging::{variant_suffix, PreTaggedFile, SupportedLanguage};

/// Resolved file locations of one combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationPaths {
    pub tags: PathBuf,
    pub training: PathBuf,
    pub bursts: PathBuf,
    pub predictions: PathBuf,
}

impl CombinationPaths {
    pub fn resolve(config: &SweepConfig, key: &CombinationKey) -> ArrResult<Self> {
        let language = SupportedLanguage::parse(&key.language)?;
        let stem = tag_stem(key.prompt_number, language);
        Ok(Self {
            tags: config.paths.tags_dir.join(format!("{}.tsv", stem)),
            training: config.paths.training_dir.join(training_file_name(key)),
            bursts: config
                .paths
                .burst_dir
                .join(burst_file_name(&stem, variant_suffix(&key.language))),
            predictions: config.paths.predictions_dir.join(prediction_log_name(key)),
        })
    }
}

/// `Prompt<N>_<lang>`, shared by every variant of a base language
pub fn tag_stem(prompt_number: u32, language: SupportedLanguage) -> String {
    format!("Prompt{}_{}", prompt_number, language.code())
}

/// Everything one successful run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationResult {
    pub key: CombinationKey,
    pub record: ArrRecord,
    /// Mean cross-validated kappa
    pub qwk: f64,
    pub fold_kappas: Vec<f64>,
    pub fit: FitSummary,
    pub tally: ScoreTally,
    pub vocabulary: usize,
    pub paths: CombinationPaths,
}

/// Generate the burst corpus for one combination and write it to disk.
pub fn generate_bursts(
    config: &SweepConfig,
    key: &CombinationKey,
    paths: &CombinationPaths,
) -> ArrResult<usize> {
    let language = SupportedLanguage::parse(&key.language)?;
    let tagger = PreTaggedFile::new(&paths.tags, language, config.encodings.tags);
    let table = NounFrequencyTable::from_tokens(&tagger.tokens()?)?;

    let source = source_prompt_id(&paths.tags);
    let bursts = BurstGenerator::new(config.seed)
        .with_target_length(config.target_length)
        .with_max_rejections(config.max_rejections)
        .generate_dataset(&table, config.burst_amount, &source)?;
    write_burst_corpus(&paths.bursts, &bursts, &config.id_prefix)?;
    Ok(table.len())
}

fn source_prompt_id(tags: &Path) -> String {
    tags.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Run every stage for one combination.
pub fn run_combination(config: &SweepConfig, key: &CombinationKey) -> ArrResult<CombinationResult> {
    let language = SupportedLanguage::parse(&key.language)?;
    let paths = CombinationPaths::resolve(config, key)?;
    debug!(combination = %key, ?paths, "resolved combination paths");

    let vocabulary = generate_bursts(config, key, &paths)?;

    let examples = read_training_file(&paths.training, config.encodings.training)?;
    let template = ScoringModel::for_combination(key.clone(), config.scoring);
    let cv = CrossValidator::new(config.folds, config.cv_seed).evaluate_detailed(&template, &examples)?;

    // Final model sees the same file the kappa was estimated on
    let mut model = template.fresh();
    let fit = model.fit(&examples)?;

    let adversarial = read_adversarial_file(&paths.bursts, config.encodings.adversarial)?;
    let outcome = compute_arr(&model, &adversarial)?;
    write_prediction_log(&paths.predictions, &outcome.predictions)?;

    let record = ArrRecord {
        method: config.method.clone(),
        prompt_id: key.prompt_id(),
        prompt_number: key.prompt_number,
        language: language.code().to_string(),
        arr: outcome.arr,
    };
    info!(
        combination = %key,
        arr = record.arr,
        qwk = cv.mean_kappa,
        "combination complete"
    );

    Ok(CombinationResult {
        key: key.clone(),
        record,
        qwk: cv.mean_kappa,
        fold_kappas: cv.fold_kappas,
        fit,
        tally: outcome.tally(),
        vocabulary,
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_paths() {
        let config = SweepConfig::default();
        let key = CombinationKey::new("en_orig300", 2);
        let paths = CombinationPaths::resolve(&config, &key).unwrap();
        assert!(paths.tags.ends_with("Prompt2_en.tsv"));
        assert!(paths.training.ends_with("ASAP_en_orig300_prompt2.tsv"));
        assert!(paths.bursts.ends_with("Prompt2_en_orig300_burst_result.tsv"));
        assert!(paths.predictions.ends_with("ARR_en_orig300_prompt2.tsv"));
    }

    #[test]
    fn test_base_language_paths() {
        let config = SweepConfig::default();
        let paths = CombinationPaths::resolve(&config, &CombinationKey::new("de", 10)).unwrap();
        assert!(paths.tags.ends_with("Prompt10_de.tsv"));
        assert!(paths.bursts.ends_with("Prompt10_de_burst_result.tsv"));
    }

    #[test]
    fn test_unsupported_language() {
        let config = SweepConfig::default();
        let err = CombinationPaths::resolve(&config, &CombinationKey::new("it", 1)).unwrap_err();
        assert_eq!(err.kind(), "UnsupportedLanguageError");
    }
}
