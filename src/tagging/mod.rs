//! Part-of-speech tagging seam
//!
//! Tagging itself happens outside this crate. The core only needs a
//! sequence of `(token, tag)` pairs per document, which a [`PosTagger`]
//! supplies. [`PreTaggedFile`] is the implementation used by the CLI: it
//! reads the output of an external tagger stored as TSV.

mod pretagged;

pub use pretagged::{parse_tagged_tsv, PreTaggedFile};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ArrError, ArrResult};
use crate::models::TaggedToken;

/// Languages for which a tagging model exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    En,
    De,
    Es,
    Fr,
}

impl SupportedLanguage {
    pub const ALL: [SupportedLanguage; 4] = [
        SupportedLanguage::En,
        SupportedLanguage::De,
        SupportedLanguage::Es,
        SupportedLanguage::Fr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            SupportedLanguage::En => "en",
            SupportedLanguage::De => "de",
            SupportedLanguage::Es => "es",
            SupportedLanguage::Fr => "fr",
        }
    }

    /// Resolve a configured language code to its tagger language.
    ///
    /// English corpus variants (`en_orig`, `en_orig300`, ...) share the
    /// English tagger.
    pub fn parse(code: &str) -> ArrResult<Self> {
        let lower = code.trim().to_lowercase();
        let base = if variant_suffix(&lower).is_some() {
            "en"
        } else {
            lower.as_str()
        };

        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == base)
            .ok_or_else(|| ArrError::UnsupportedLanguage {
                requested: code.to_string(),
                supported: Self::ALL.iter().map(|l| l.code().to_string()).collect(),
            })
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Suffix that distinguishes an English corpus variant, e.g. `orig300`
/// for `en_orig300`. `None` for plain language codes.
pub fn variant_suffix(code: &str) -> Option<&str> {
    code.strip_prefix("en_").filter(|s| !s.is_empty())
}

/// Black-box tagging service: maps document text to tagged tokens.
pub trait PosTagger {
    fn language(&self) -> SupportedLanguage;

    /// Tokens of `text` in document order. Fails rather than returning
    /// tokens of some other document.
    fn tag(&self, text: &str) -> ArrResult<Vec<TaggedToken>>;
}

/// Noun vs. everything-else counts for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosCounts {
    pub noun: usize,
    pub non_noun: usize,
    pub total: usize,
}

impl PosCounts {
    pub fn from_tokens(tokens: &[TaggedToken]) -> Self {
        let noun = tokens.iter().filter(|t| t.pos.is_noun()).count();
        Self {
            noun,
            non_noun: tokens.len() - noun,
            total: tokens.len(),
        }
    }

    /// Share of nouns among all tokens, 0.0 for an empty document.
    pub fn noun_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.noun as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PosTag;

    #[test]
    fn test_parse_language_variants() {
        assert_eq!(SupportedLanguage::parse("de").unwrap(), SupportedLanguage::De);
        assert_eq!(
            SupportedLanguage::parse("en_orig300").unwrap(),
            SupportedLanguage::En
        );
        assert_eq!(SupportedLanguage::parse("EN").unwrap(), SupportedLanguage::En);
    }

    #[test]
    fn test_unsupported_language() {
        match SupportedLanguage::parse("it") {
            Err(ArrError::UnsupportedLanguage { requested, supported }) => {
                assert_eq!(requested, "it");
                assert_eq!(supported, vec!["en", "de", "es", "fr"]);
            }
            other => panic!("expected UnsupportedLanguage, got {:?}", other),
        }
    }

    #[test]
    fn test_variant_suffix() {
        assert_eq!(variant_suffix("en_orig300"), Some("orig300"));
        assert_eq!(variant_suffix("en"), None);
        assert_eq!(variant_suffix("fr"), None);
    }

    #[test]
    fn test_pos_counts() {
        let tokens = vec![
            TaggedToken::new("Haus", PosTag::Noun),
            TaggedToken::new("ist", PosTag::Aux),
            TaggedToken::new("Garten", PosTag::Noun),
            TaggedToken::new(".", PosTag::Punct),
        ];
        let counts = PosCounts::from_tokens(&tokens);
        assert_eq!(counts.noun, 2);
        assert_eq!(counts.non_noun, 2);
        assert_eq!(counts.total, 4);
        assert!((counts.noun_ratio() - 0.5).abs() < 1e-12);
        assert_eq!(PosCounts::default().noun_ratio(), 0.0);
    }
}
