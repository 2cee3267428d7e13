//! Feature pipeline for answer texts
//!
//! Each text becomes a sparse row made of three blocks, in this order:
//!
//! ```text
//! [ char 2-5 gram counts | word 1-5 gram counts | length ]
//! ```
//!
//! The length feature is the character count min-max scaled with the
//! bounds of the fit corpus. Lengths outside those bounds are not clamped.

mod vectorizer;

pub use vectorizer::{Analyzer, CountVectorizer, DEFAULT_MAX_FEATURES};

use tracing::debug;

use crate::error::{ArrError, ArrResult};

/// Sparse feature vector, entries sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    entries: Vec<(usize, f64)>,
}

impl FeatureRow {
    pub fn new(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|(_, v)| *v != 0.0);
        entries.sort_unstable_by_key(|(col, _)| *col);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn get(&self, col: usize) -> f64 {
        self.entries
            .binary_search_by_key(&col, |(c, _)| *c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    pub fn dot(&self, other: &FeatureRow) -> f64 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn squared_norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum()
    }
}

/// Min-max scaling of text length learned from the fit corpus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthScaler {
    min: f64,
    max: f64,
}

impl LengthScaler {
    pub fn fit(lengths: impl IntoIterator<Item = usize>) -> Option<Self> {
        let mut bounds: Option<(f64, f64)> = None;
        for len in lengths {
            let len = len as f64;
            bounds = Some(match bounds {
                None => (len, len),
                Some((lo, hi)) => (lo.min(len), hi.max(len)),
            });
        }
        bounds.map(|(min, max)| Self { min, max })
    }

    pub fn scale(&self, length: usize) -> f64 {
        let range = self.max - self.min;
        // A constant-length corpus keeps unit scale
        let range = if range == 0.0 { 1.0 } else { range };
        (length as f64 - self.min) / range
    }
}

/// Fitted state of the pipeline.
#[derive(Debug, Clone)]
struct FittedFeatures {
    char_vectorizer: CountVectorizer,
    word_vectorizer: CountVectorizer,
    length: LengthScaler,
}

/// Char n-grams + word n-grams + scaled length.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    char_analyzer: Analyzer,
    word_analyzer: Analyzer,
    max_features: usize,
    fitted: Option<FittedFeatures>,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturePipeline {
    pub fn new() -> Self {
        Self {
            char_analyzer: Analyzer::Char { min_n: 2, max_n: 5 },
            word_analyzer: Analyzer::Word { min_n: 1, max_n: 5 },
            max_features: DEFAULT_MAX_FEATURES,
            fitted: None,
        }
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features.max(1);
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Total number of columns, 0 before fit.
    pub fn n_features(&self) -> usize {
        self.fitted
            .as_ref()
            .map(|f| f.char_vectorizer.vocabulary_len() + f.word_vectorizer.vocabulary_len() + 1)
            .unwrap_or(0)
    }

    /// Learn vocabularies and length bounds. Replaces previous state.
    pub fn fit(&mut self, texts: &[&str]) -> ArrResult<()> {
        if texts.is_empty() {
            return Err(ArrError::FeatureFit("training corpus is empty".into()));
        }

        let mut char_vectorizer = CountVectorizer::new(self.char_analyzer, self.max_features);
        char_vectorizer.fit(texts.iter().copied());
        let mut word_vectorizer = CountVectorizer::new(self.word_analyzer, self.max_features);
        word_vectorizer.fit(texts.iter().copied());

        if char_vectorizer.vocabulary_len() == 0 && word_vectorizer.vocabulary_len() == 0 {
            return Err(ArrError::FeatureFit(
                "empty vocabulary: no n-grams in training corpus".into(),
            ));
        }

        let length = LengthScaler::fit(texts.iter().map(|t| t.chars().count()))
            .ok_or_else(|| ArrError::FeatureFit("training corpus is empty".into()))?;

        debug!(
            char_vocab = char_vectorizer.vocabulary_len(),
            word_vocab = word_vectorizer.vocabulary_len(),
            docs = texts.len(),
            "fitted feature pipeline"
        );

        self.fitted = Some(FittedFeatures {
            char_vectorizer,
            word_vectorizer,
            length,
        });
        Ok(())
    }

    pub fn transform_one(&self, text: &str) -> ArrResult<FeatureRow> {
        let fitted = self.fitted.as_ref().ok_or(ArrError::NotFitted)?;
        let char_width = fitted.char_vectorizer.vocabulary_len();
        let word_width = fitted.word_vectorizer.vocabulary_len();

        let mut entries = fitted.char_vectorizer.transform(text);
        entries.extend(
            fitted
                .word_vectorizer
                .transform(text)
                .into_iter()
                .map(|(col, v)| (col + char_width, v)),
        );
        entries.push((
            char_width + word_width,
            fitted.length.scale(text.chars().count()),
        ));

        Ok(FeatureRow::new(entries))
    }

    pub fn transform(&self, texts: &[&str]) -> ArrResult<Vec<FeatureRow>> {
        texts.iter().map(|t| self.transform_one(t)).collect()
    }

    pub fn fit_transform(&mut self, texts: &[&str]) -> ArrResult<Vec<FeatureRow>> {
        self.fit(texts)?;
        self.transform(texts)
    }
}
