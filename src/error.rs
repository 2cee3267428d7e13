//! Error taxonomy for the generation and evaluation core
//!
//! Every variant is local to a single (language, prompt) combination: the
//! sweep logs it, records it as a failed outcome in the aggregate report and
//! moves on. Variants raised while reading or writing a file carry its path.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArrError {
    #[error("no noun tokens to sample from")]
    EmptyVocabulary,

    #[error("burst generation stalled after {attempts} single-character draws")]
    GenerationStalled { attempts: usize },

    #[error("cannot fit feature pipeline: {0}")]
    FeatureFit(String),

    #[error("scoring model used before fit")]
    NotFitted,

    #[error("adversarial set is empty, rejection rate undefined")]
    EmptyAdversarialSet,

    #[error("unsupported language '{requested}'. Supported languages: {}", supported.join(", "))]
    UnsupportedLanguage {
        requested: String,
        supported: Vec<String>,
    },

    #[error("invalid score '{value}' on line {line} (expected 0-3)")]
    InvalidScore { line: usize, value: String },

    #[error("column '{column}' missing in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("{} is not valid {encoding}", path.display())]
    Decode { path: PathBuf, encoding: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ArrResult<T> = Result<T, ArrError>;

impl ArrError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        ArrError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short, stable name used in reports and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ArrError::EmptyVocabulary => "EmptyVocabularyError",
            ArrError::GenerationStalled { .. } => "GenerationStalledError",
            ArrError::FeatureFit(_) => "FeatureFitError",
            ArrError::NotFitted => "NotFittedError",
            ArrError::EmptyAdversarialSet => "EmptyAdversarialSetError",
            ArrError::UnsupportedLanguage { .. } => "UnsupportedLanguageError",
            ArrError::InvalidScore { .. } => "InvalidScoreError",
            ArrError::MissingColumn { .. } => "MissingColumnError",
            ArrError::Decode { .. } => "DecodeError",
            ArrError::InvalidInput(_) => "InvalidInputError",
            ArrError::Io { .. } => "IoError",
        }
    }
}
