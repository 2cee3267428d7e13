//! Noun frequency model
//!
//! Relative frequencies of noun surface forms in one document. Only nouns
//! that occur are present; frequencies sum to one.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{ArrError, ArrResult};
use crate::models::TaggedToken;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NounEntry {
    pub noun: String,
    pub count: usize,
    pub frequency: f64,
}

/// Discrete distribution over nouns, in order of first occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct NounFrequencyTable {
    entries: Vec<NounEntry>,
    total: usize,
}

impl NounFrequencyTable {
    /// Build the table from a tagged document. Non-noun tokens are ignored.
    pub fn from_tokens(tokens: &[TaggedToken]) -> ArrResult<Self> {
        Self::from_nouns(
            tokens
                .iter()
                .filter(|t| t.pos.is_noun())
                .map(|t| t.text.as_str()),
        )
    }

    /// Build the table from noun surface forms directly.
    pub fn from_nouns<'a>(nouns: impl IntoIterator<Item = &'a str>) -> ArrResult<Self> {
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut counted: Vec<(&str, usize)> = Vec::new();
        let mut total = 0usize;

        for noun in nouns {
            if noun.is_empty() {
                continue;
            }
            total += 1;
            match index.get(noun) {
                Some(&i) => counted[i].1 += 1,
                None => {
                    index.insert(noun, counted.len());
                    counted.push((noun, 1));
                }
            }
        }

        if total == 0 {
            return Err(ArrError::EmptyVocabulary);
        }

        let entries = counted
            .into_iter()
            .map(|(noun, count)| NounEntry {
                noun: noun.to_string(),
                count,
                frequency: count as f64 / total as f64,
            })
            .collect();

        Ok(Self { entries, total })
    }

    /// Build from explicit `(noun, weight)` pairs. Weights are normalised.
    pub fn from_weights<S: AsRef<str>>(weights: &[(S, f64)]) -> ArrResult<Self> {
        let sum: f64 = weights
            .iter()
            .map(|(_, w)| *w)
            .filter(|w| w.is_finite() && *w > 0.0)
            .sum();
        if sum <= 0.0 {
            return Err(ArrError::EmptyVocabulary);
        }

        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
        let mut entries: Vec<NounEntry> = Vec::new();
        for (noun, weight) in weights {
            let noun = noun.as_ref();
            if noun.is_empty() || !weight.is_finite() || *weight <= 0.0 {
                continue;
            }
            match seen.get(noun) {
                Some(&i) => entries[i].frequency += weight / sum,
                None => {
                    seen.insert(noun, entries.len());
                    entries.push(NounEntry {
                        noun: noun.to_string(),
                        count: 0,
                        frequency: weight / sum,
                    });
                }
            }
        }

        Ok(Self { entries, total: 0 })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of noun tokens the table was counted from (0 for weighted tables).
    pub fn total_nouns(&self) -> usize {
        self.total
    }

    pub fn entries(&self) -> &[NounEntry] {
        &self.entries
    }

    pub fn nouns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.noun.as_str())
    }

    pub fn frequency(&self, noun: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.noun == noun)
            .map(|e| e.frequency)
    }

    /// Whether at least one noun is longer than a single character.
    pub fn has_multi_char_noun(&self) -> bool {
        self.entries.iter().any(|e| e.noun.chars().count() > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PosTag;

    fn tokens(pairs: &[(&str, PosTag)]) -> Vec<TaggedToken> {
        pairs.iter().map(|(t, p)| TaggedToken::new(*t, *p)).collect()
    }

    #[test]
    fn test_only_nouns_counted() {
        let doc = tokens(&[
            ("Der", PosTag::Det),
            ("Hund", PosTag::Noun),
            ("bellt", PosTag::Verb),
            ("Katze", PosTag::Noun),
            ("Hund", PosTag::Noun),
            ("Berlin", PosTag::Propn),
        ]);
        let table = NounFrequencyTable::from_tokens(&doc).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.total_nouns(), 3);
        assert!((table.frequency("Hund").unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((table.frequency("Katze").unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!(table.frequency("bellt").is_none());
        assert!(table.frequency("Berlin").is_none());
    }

    #[test]
    fn test_frequencies_sum_to_one() {
        let nouns: Vec<String> = (0..97).map(|i| format!("noun{}", i % 13)).collect();
        let table = NounFrequencyTable::from_nouns(nouns.iter().map(|s| s.as_str())).unwrap();
        let sum: f64 = table.entries().iter().map(|e| e.frequency).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(table.entries().iter().all(|e| e.frequency > 0.0 && e.frequency <= 1.0));
    }

    #[test]
    fn test_first_occurrence_order() {
        let table = NounFrequencyTable::from_nouns(["b", "a", "b", "c"]).unwrap();
        let order: Vec<&str> = table.nouns().collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_no_nouns_is_error() {
        let doc = tokens(&[("läuft", PosTag::Verb), (".", PosTag::Punct)]);
        assert!(matches!(
            NounFrequencyTable::from_tokens(&doc),
            Err(ArrError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_from_weights_normalises() {
        let table = NounFrequencyTable::from_weights(&[("cat", 2.0), ("dog", 2.0)]).unwrap();
        assert_eq!(table.frequency("cat"), Some(0.5));
        assert_eq!(table.frequency("dog"), Some(0.5));
        assert!(NounFrequencyTable::from_weights::<&str>(&[]).is_err());
    }
}
