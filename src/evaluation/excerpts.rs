//! Excerpt selection and score tallies over prediction logs
//!
//! Two separate channels come out of one pass over a log:
//! a [`ScoreTally`] counting every row, and an [`ExcerptSample`] holding at
//! most a few displayable sentences per band. Sentences with digits or
//! punctuation are skipped for display but still counted.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::models::{ScoreBand, ScoredBurst};

/// Sentences kept per band for manual review
pub const EXCERPTS_PER_BAND: usize = 2;

/// Punctuation, symbols and digits. `\w` covers digits, so they are
/// excluded explicitly: a sentence with any number is never displayed.
fn not_displayable() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]|\d").expect("valid regex"))
}

/// Whether a sentence is shown in excerpts.
pub fn is_displayable(sentence: &str) -> bool {
    !not_displayable().is_match(sentence)
}

/// Complete count of predictions per band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreTally {
    counts: [usize; 4],
}

impl ScoreTally {
    pub fn from_bands(bands: impl IntoIterator<Item = ScoreBand>) -> Self {
        let mut tally = Self::default();
        for band in bands {
            tally.add(band);
        }
        tally
    }

    pub fn add(&mut self, band: ScoreBand) {
        self.counts[band.index()] += 1;
    }

    pub fn count(&self, band: ScoreBand) -> usize {
        self.counts[band.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn merge(&mut self, other: &ScoreTally) {
        for (a, b) in self.counts.iter_mut().zip(other.counts) {
            *a += b;
        }
    }
}

/// Display-filtered sentences per band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExcerptSample {
    per_band: [Vec<String>; 4],
}

impl ExcerptSample {
    /// Offer a sentence; returns whether it was kept.
    pub fn offer(&mut self, sentence: &str, band: ScoreBand) -> bool {
        let slot = &mut self.per_band[band.index()];
        if slot.len() >= EXCERPTS_PER_BAND || !is_displayable(sentence) {
            return false;
        }
        slot.push(sentence.to_string());
        true
    }

    pub fn band(&self, band: ScoreBand) -> &[String] {
        &self.per_band[band.index()]
    }
}

/// Both channels for one prediction log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptExcerpts {
    /// Display name, e.g. `de prompt10`
    pub prompt: String,
    pub tally: ScoreTally,
    pub sample: ExcerptSample,
}

/// Aggregate band counts across all logs.
pub type ScoreDistribution = ScoreTally;

/// Collects excerpts from prediction logs in the order they are added.
#[derive(Debug, Default)]
pub struct ExcerptCollector {
    prompts: Vec<PromptExcerpts>,
}

impl ExcerptCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_log(&mut self, prompt: impl Into<String>, rows: &[ScoredBurst]) {
        let mut tally = ScoreTally::default();
        let mut sample = ExcerptSample::default();
        for row in rows {
            tally.add(row.predicted);
            sample.offer(&row.text, row.predicted);
        }
        self.prompts.push(PromptExcerpts {
            prompt: prompt.into(),
            tally,
            sample,
        });
    }

    pub fn prompts(&self) -> &[PromptExcerpts] {
        &self.prompts
    }

    pub fn distribution(&self) -> ScoreDistribution {
        let mut total = ScoreTally::default();
        for p in &self.prompts {
            total.merge(&p.tally);
        }
        total
    }
}

/// `ARR_de_prompt10.tsv` → `de prompt10`
pub fn prompt_display_name(file_stem: &str) -> String {
    file_stem.replace('_', " ").replace("ARR", "").trim().to_string()
}
