//! Core data models for burstarr
//!
//! These models are shared by the burst generator, the scoring pipeline
//! and the report writers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ArrError, ArrResult};

/// Universal part-of-speech tag as produced by the external tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Noun,
    Propn,
    Verb,
    Aux,
    Adj,
    Adv,
    Adp,
    Det,
    Pron,
    Num,
    Cconj,
    Sconj,
    Part,
    Intj,
    Punct,
    Sym,
    Space,
    #[serde(other)]
    X,
}

impl PosTag {
    /// Parse a Universal POS label. Unknown labels map to `X`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "NOUN" => PosTag::Noun,
            "PROPN" => PosTag::Propn,
            "VERB" => PosTag::Verb,
            "AUX" => PosTag::Aux,
            "ADJ" => PosTag::Adj,
            "ADV" => PosTag::Adv,
            "ADP" => PosTag::Adp,
            "DET" => PosTag::Det,
            "PRON" => PosTag::Pron,
            "NUM" => PosTag::Num,
            "CCONJ" | "CONJ" => PosTag::Cconj,
            "SCONJ" => PosTag::Sconj,
            "PART" => PosTag::Part,
            "INTJ" => PosTag::Intj,
            "PUNCT" => PosTag::Punct,
            "SYM" => PosTag::Sym,
            "SPACE" => PosTag::Space,
            _ => PosTag::X,
        }
    }

    pub fn is_noun(&self) -> bool {
        matches!(self, PosTag::Noun)
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PosTag::Noun => "NOUN",
            PosTag::Propn => "PROPN",
            PosTag::Verb => "VERB",
            PosTag::Aux => "AUX",
            PosTag::Adj => "ADJ",
            PosTag::Adv => "ADV",
            PosTag::Adp => "ADP",
            PosTag::Det => "DET",
            PosTag::Pron => "PRON",
            PosTag::Num => "NUM",
            PosTag::Cconj => "CCONJ",
            PosTag::Sconj => "SCONJ",
            PosTag::Part => "PART",
            PosTag::Intj => "INTJ",
            PosTag::Punct => "PUNCT",
            PosTag::Sym => "SYM",
            PosTag::Space => "SPACE",
            PosTag::X => "X",
        };
        f.write_str(label)
    }
}

/// A single token with its grammatical category, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub text: String,
    pub pos: PosTag,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, pos: PosTag) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}

/// One of the four ordinal grades a human scorer can assign.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum ScoreBand {
    #[default]
    Zero,
    One,
    Two,
    Three,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 4] = [
        ScoreBand::Zero,
        ScoreBand::One,
        ScoreBand::Two,
        ScoreBand::Three,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(ScoreBand::Zero),
            1 => Some(ScoreBand::One),
            2 => Some(ScoreBand::Two),
            3 => Some(ScoreBand::Three),
            _ => None,
        }
    }

    /// Parse a score cell. Accepts integral floats such as `2.0`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(v) = trimmed.parse::<u8>() {
            return Self::from_value(v);
        }
        let v = trimmed.parse::<f64>().ok()?;
        if v.fract() != 0.0 || !(0.0..=3.0).contains(&v) {
            return None;
        }
        Self::from_value(v as u8)
    }
}

impl From<ScoreBand> for u8 {
    fn from(band: ScoreBand) -> Self {
        band.value()
    }
}

impl TryFrom<u8> for ScoreBand {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ScoreBand::from_value(value).ok_or_else(|| format!("score {} outside 0-3", value))
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Human-scored training row. Empty text is valid evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub score: ScoreBand,
}

impl LabeledExample {
    pub fn new(text: impl Into<String>, score: ScoreBand) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }

    /// Build from a raw integer score, rejecting anything outside 0-3.
    pub fn with_raw_score(text: impl Into<String>, score: i64) -> ArrResult<Self> {
        let band = u8::try_from(score)
            .ok()
            .and_then(ScoreBand::from_value)
            .ok_or_else(|| ArrError::InvalidScore {
                line: 0,
                value: score.to_string(),
            })?;
        Ok(Self::new(text, band))
    }
}

/// A single synthetic sentence. Its synthetic score is always zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedBurst {
    pub text: String,
    pub source_prompt_id: String,
}

impl GeneratedBurst {
    pub fn synthetic_score(&self) -> ScoreBand {
        ScoreBand::Zero
    }
}

/// A prediction paired with the text it was made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredBurst {
    pub text: String,
    pub predicted: ScoreBand,
}

/// Identity of one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombinationKey {
    /// Language code as configured, e.g. `de` or `en_orig300`
    pub language: String,
    pub prompt_number: u32,
}

impl CombinationKey {
    pub fn new(language: impl Into<String>, prompt_number: u32) -> Self {
        Self {
            language: language.into(),
            prompt_number,
        }
    }

    /// Report label, e.g. `de_prompt10`
    pub fn label(&self) -> String {
        format!("{}_prompt{}", self.language, self.prompt_number)
    }

    /// Training-data stem, e.g. `ASAP_de_prompt10`
    pub fn prompt_id(&self) -> String {
        format!("ASAP_{}", self.label())
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Terminal artifact of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrRecord {
    pub method: String,
    pub prompt_id: String,
    pub prompt_number: u32,
    pub language: String,
    pub arr: f64,
}
