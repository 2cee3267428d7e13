//! N-gram count vectorizer
//!
//! Character n-grams run over the lowercased text with whitespace runs
//! collapsed to one space. Word n-grams run over lowercased tokens of two
//! or more word characters. The vocabulary keeps the `max_features` most
//! frequent n-grams of the fit corpus (ties broken alphabetically) and
//! indexes them in alphabetical order.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Default vocabulary cap per vectorizer
pub const DEFAULT_MAX_FEATURES: usize = 10_000;

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s\s+").expect("valid regex"))
}

fn word_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid regex"))
}

/// How a document is split into n-grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyzer {
    Char { min_n: usize, max_n: usize },
    Word { min_n: usize, max_n: usize },
}

impl Analyzer {
    /// Extract all n-grams of a document, with repetition.
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let lower = doc.to_lowercase();
        match *self {
            Analyzer::Char { min_n, max_n } => {
                let normalized = whitespace_runs().replace_all(&lower, " ");
                let chars: Vec<char> = normalized.chars().collect();
                let mut grams = Vec::new();
                for n in min_n.max(1)..=max_n.min(chars.len()) {
                    for window in chars.windows(n) {
                        grams.push(window.iter().collect());
                    }
                }
                grams
            }
            Analyzer::Word { min_n, max_n } => {
                let tokens: Vec<&str> = word_token().find_iter(&lower).map(|m| m.as_str()).collect();
                let mut grams = Vec::new();
                for n in min_n.max(1)..=max_n.min(tokens.len()) {
                    for window in tokens.windows(n) {
                        grams.push(window.join(" "));
                    }
                }
                grams
            }
        }
    }
}

/// Bag-of-n-grams counter with a capped vocabulary.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    analyzer: Analyzer,
    max_features: usize,
    vocabulary: FxHashMap<String, usize>,
}

impl CountVectorizer {
    pub fn new(analyzer: Analyzer, max_features: usize) -> Self {
        Self {
            analyzer,
            max_features,
            vocabulary: FxHashMap::default(),
        }
    }

    pub fn analyzer(&self) -> Analyzer {
        self.analyzer
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn index_of(&self, gram: &str) -> Option<usize> {
        self.vocabulary.get(gram).copied()
    }

    /// Learn the vocabulary. Replaces any previous vocabulary.
    pub fn fit<'a>(&mut self, docs: impl IntoIterator<Item = &'a str>) {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for doc in docs {
            for gram in self.analyzer.analyze(doc) {
                *counts.entry(gram).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut kept: Vec<String> = ranked.into_iter().map(|(gram, _)| gram).collect();
        kept.sort();

        self.vocabulary = kept.into_iter().enumerate().map(|(i, g)| (g, i)).collect();
    }

    /// Count known n-grams of one document. Output is sorted by column.
    pub fn transform(&self, doc: &str) -> Vec<(usize, f64)> {
        let mut counts: FxHashMap<usize, f64> = FxHashMap::default();
        for gram in self.analyzer.analyze(doc) {
            if let Some(&col) = self.vocabulary.get(&gram) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }
        let mut row: Vec<(usize, f64)> = counts.into_iter().collect();
        row.sort_unstable_by_key(|(col, _)| *col);
        row
    }
}
