//! Tagger backed by pre-computed tagger output
//!
//! File format: one `token<TAB>TAG` row per token, in document order.
//! Blank lines (sentence breaks) are skipped, as are `#` comment rows
//! without a tab.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::{PosTagger, SupportedLanguage};
use crate::encoding::TextEncoding;
use crate::error::{ArrError, ArrResult};
use crate::models::{PosTag, TaggedToken};

/// Parse tagger TSV output into tokens.
pub fn parse_tagged_tsv(content: &str) -> ArrResult<Vec<TaggedToken>> {
    let mut tokens = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || (line.starts_with('#') && !line.contains('\t')) {
            continue;
        }

        let Some((text, tag)) = line.split_once('\t') else {
            return Err(ArrError::InvalidInput(format!(
                "line {}: expected token<TAB>tag, got '{}'",
                idx + 1,
                line
            )));
        };
        // Extra columns (lemma, morphology) are allowed after the tag
        let tag = tag.split('\t').next().unwrap_or_default();
        tokens.push(TaggedToken::new(text, PosTag::from_label(tag)));
    }

    Ok(tokens)
}

/// A document whose tags were produced ahead of time.
#[derive(Debug, Clone)]
pub struct PreTaggedFile {
    path: PathBuf,
    language: SupportedLanguage,
    encoding: TextEncoding,
}

impl PreTaggedFile {
    pub fn new(path: impl Into<PathBuf>, language: SupportedLanguage, encoding: TextEncoding) -> Self {
        Self {
            path: path.into(),
            language,
            encoding,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every token of the backing file.
    pub fn tokens(&self) -> ArrResult<Vec<TaggedToken>> {
        let content = self.encoding.read_to_string(&self.path)?;
        let tokens = parse_tagged_tsv(&content)?;
        debug!(
            path = %self.path.display(),
            language = %self.language,
            tokens = tokens.len(),
            "loaded tagged tokens"
        );
        Ok(tokens)
    }
}

impl PosTagger for PreTaggedFile {
    fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the stored tokens when they spell out `text`, ignoring
    /// whitespace. A file tagged from a different document is rejected.
    fn tag(&self, text: &str) -> ArrResult<Vec<TaggedToken>> {
        let tokens = self.tokens()?;
        let expected = text.chars().filter(|c| !c.is_whitespace());
        let stored = tokens
            .iter()
            .flat_map(|t| t.text.chars())
            .filter(|c| !c.is_whitespace());
        if !expected.eq(stored) {
            return Err(ArrError::InvalidInput(format!(
                "tags in {} were not produced from the given text",
                self.path.display()
            )));
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_tsv() {
        let content = "# sent 1\nDas\tDET\nHaus\tNOUN\n\nGarten\tNOUN\tGarten\n.\tPUNCT\n";
        let tokens = parse_tagged_tsv(content).unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1], TaggedToken::new("Haus", PosTag::Noun));
        assert_eq!(tokens[2].pos, PosTag::Noun);
        assert_eq!(tokens[3].pos, PosTag::Punct);

        let hashed = parse_tagged_tsv("#\tSYM\n").unwrap();
        assert_eq!(hashed, vec![TaggedToken::new("#", PosTag::Sym)]);
    }

    #[test]
    fn test_parse_rejects_untagged_row() {
        let err = parse_tagged_tsv("Haus NOUN\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_pretagged_file_reads_latin1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Prompt1_de.tsv");
        std::fs::write(&path, b"H\xE4user\tNOUN\nsind\tAUX\n").unwrap();

        let file = PreTaggedFile::new(&path, SupportedLanguage::De, TextEncoding::Latin1);
        let tokens = file.tag("Häuser sind").unwrap();
        assert_eq!(tokens[0].text, "Häuser");
        assert_eq!(file.language(), SupportedLanguage::De);
    }

    #[test]
    fn test_pretagged_file_rejects_other_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Prompt1_de.tsv");
        std::fs::write(&path, "Das\tDET\nHaus\tNOUN\n.\tPUNCT\n").unwrap();

        let file = PreTaggedFile::new(&path, SupportedLanguage::De, TextEncoding::Utf8);
        assert_eq!(file.tag("Das  Haus.\n").unwrap().len(), 3);
        let err = file.tag("Der Garten.").unwrap_err();
        assert!(matches!(err, ArrError::InvalidInput(_)));
        assert!(err.to_string().contains("Prompt1_de.tsv"));
        assert!(file.tag("").is_err());
    }
}
