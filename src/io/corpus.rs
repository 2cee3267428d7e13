//! Training rows, adversarial corpora and prediction logs on disk

use std::fs;
use std::path::Path;

use tracing::debug;

use super::tsv::{join_record, split_records, Table, TAB};
use crate::encoding::TextEncoding;
use crate::error::{ArrError, ArrResult};
use crate::models::{CombinationKey, GeneratedBurst, LabeledExample, ScoreBand, ScoredBurst};

/// Header of a generated burst corpus. The misspelt column is what the
/// downstream scoring tools read.
pub const BURST_HEADER: [&str; 5] = ["id", "EssaySet", "eassay_score", "essay_score", "EssayText"];

/// Text column of an adversarial corpus
pub const ADVERSARIAL_TEXT_COLUMN: &str = "EssayText";

/// `<stem>[_<suffix>]_burst_result.tsv`
pub fn burst_file_name(prompt_stem: &str, suffix: Option<&str>) -> String {
    match suffix.filter(|s| !s.is_empty()) {
        Some(suffix) => format!("{}_{}_burst_result.tsv", prompt_stem, suffix),
        None => format!("{}_burst_result.tsv", prompt_stem),
    }
}

/// `ARR_<lang>_prompt<N>.tsv`
pub fn prediction_log_name(key: &CombinationKey) -> String {
    format!("ARR_{}.tsv", key.label())
}

/// `ASAP_<lang>_prompt<N>.tsv`
pub fn training_file_name(key: &CombinationKey) -> String {
    format!("{}.tsv", key.prompt_id())
}

/// Read scored training rows. Empty text is kept.
pub fn read_training_file(path: &Path, encoding: TextEncoding) -> ArrResult<Vec<LabeledExample>> {
    let content = encoding.read_to_string(path)?;
    let table = Table::parse(path, &content, TAB)?;
    let text_col = table.column("text")?;
    let score_col = table.column("score")?;

    let mut examples = Vec::with_capacity(table.len());
    for (line, fields) in table.rows() {
        let text = fields.get(text_col).cloned().unwrap_or_default();
        let raw = fields.get(score_col).map(String::as_str).unwrap_or("");
        let score = ScoreBand::parse(raw).ok_or_else(|| ArrError::InvalidScore {
            line,
            value: raw.to_string(),
        })?;
        examples.push(LabeledExample::new(text, score));
    }

    debug!(path = %path.display(), rows = examples.len(), "read training file");
    Ok(examples)
}

/// Read the `EssayText` column of an adversarial corpus.
pub fn read_adversarial_file(path: &Path, encoding: TextEncoding) -> ArrResult<Vec<String>> {
    let content = encoding.read_to_string(path)?;
    let table = Table::parse(path, &content, TAB)?;
    let col = table.column(ADVERSARIAL_TEXT_COLUMN)?;
    let texts: Vec<String> = table
        .rows()
        .map(|(_, fields)| fields.get(col).cloned().unwrap_or_default())
        .collect();
    debug!(path = %path.display(), rows = texts.len(), "read adversarial corpus");
    Ok(texts)
}

/// Render a burst corpus. Ids are `<prefix><index:03>`.
pub fn render_burst_corpus(bursts: &[GeneratedBurst], id_prefix: &str) -> String {
    let mut out = join_record(&BURST_HEADER, TAB);
    out.push('\n');
    for (i, burst) in bursts.iter().enumerate() {
        let id = format!("{}{:03}", id_prefix, i);
        let score = burst.synthetic_score().to_string();
        out.push_str(&join_record(
            &[
                id.as_str(),
                burst.source_prompt_id.as_str(),
                score.as_str(),
                score.as_str(),
                burst.text.as_str(),
            ],
            TAB,
        ));
        out.push('\n');
    }
    out
}

pub fn write_burst_corpus(path: &Path, bursts: &[GeneratedBurst], id_prefix: &str) -> ArrResult<()> {
    write_creating_dirs(path, &render_burst_corpus(bursts, id_prefix))?;
    debug!(path = %path.display(), bursts = bursts.len(), "wrote burst corpus");
    Ok(())
}

/// Write `text<TAB>label` rows, no header.
pub fn write_prediction_log(path: &Path, predictions: &[ScoredBurst]) -> ArrResult<()> {
    let mut out = String::new();
    for p in predictions {
        let label = p.predicted.to_string();
        out.push_str(&join_record(&[p.text.as_str(), label.as_str()], TAB));
        out.push('\n');
    }
    write_creating_dirs(path, &out)
}

pub fn read_prediction_log(path: &Path) -> ArrResult<Vec<ScoredBurst>> {
    let content = TextEncoding::Utf8.read_to_string(path)?;
    let mut rows = Vec::new();
    for (line, fields) in split_records(&content, TAB) {
        let (text, raw) = match fields.as_slice() {
            [text, label] => (text, label),
            _ => {
                return Err(ArrError::InvalidInput(format!(
                    "{}:{}: expected text and label, found {} fields",
                    path.display(),
                    line,
                    fields.len()
                )))
            }
        };
        let predicted = ScoreBand::parse(raw).ok_or_else(|| ArrError::InvalidScore {
            line,
            value: raw.clone(),
        })?;
        rows.push(ScoredBurst {
            text: text.clone(),
            predicted,
        });
    }
    Ok(rows)
}

pub(crate) fn write_creating_dirs(path: &Path, content: &str) -> ArrResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ArrError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| ArrError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn burst(text: &str) -> GeneratedBurst {
        GeneratedBurst {
            text: text.to_string(),
            source_prompt_id: "Prompt1".to_string(),
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(burst_file_name("Prompt1", None), "Prompt1_burst_result.tsv");
        assert_eq!(
            burst_file_name("Prompt1", Some("orig300")),
            "Prompt1_orig300_burst_result.tsv"
        );
        let key = CombinationKey::new("de", 10);
        assert_eq!(prediction_log_name(&key), "ARR_de_prompt10.tsv");
        assert_eq!(training_file_name(&key), "ASAP_de_prompt10.tsv");
    }

    #[test]
    fn test_burst_corpus_layout() {
        let out = render_burst_corpus(&[burst("Zelle Licht"), burst("Wasser Boden")], "10700");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "id\tEssaySet\teassay_score\tessay_score\tEssayText");
        assert_eq!(lines[1], "10700000\tPrompt1\t0\t0\tZelle Licht");
        assert_eq!(lines[2], "10700001\tPrompt1\t0\t0\tWasser Boden");
    }

    #[test]
    fn test_burst_corpus_readable_as_adversarial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bursts").join("p_burst_result.tsv");
        write_burst_corpus(&path, &[burst("Größe Äpfel"), burst("Baum")], "10700").unwrap();
        let texts = read_adversarial_file(&path, TextEncoding::Utf8).unwrap();
        assert_eq!(texts, vec!["Größe Äpfel", "Baum"]);
    }

    #[test]
    fn test_training_keeps_empty_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ASAP_de_prompt1.tsv");
        fs::write(&path, "id\ttext\tscore\n1\tgood answer\t3\n2\t\t0\n3\tNone\t1\n").unwrap();
        let rows = read_training_file(&path, TextEncoding::Utf8).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], LabeledExample::new("", ScoreBand::Zero));
        assert_eq!(rows[2].text, "None");
    }

    #[test]
    fn test_training_errors() {
        let dir = tempdir().unwrap();
        let bad_score = dir.path().join("a.tsv");
        fs::write(&bad_score, "text\tscore\nok\t2\nnope\t7\n").unwrap();
        assert!(matches!(
            read_training_file(&bad_score, TextEncoding::Utf8),
            Err(ArrError::InvalidScore { line: 3, .. })
        ));

        let no_score = dir.path().join("b.tsv");
        fs::write(&no_score, "text\tlabel\nok\t2\n").unwrap();
        assert!(matches!(
            read_training_file(&no_score, TextEncoding::Utf8),
            Err(ArrError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_training_answer_spanning_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ASAP_de_prompt1.tsv");
        fs::write(
            &path,
            "text\tscore\n\"first line\nsecond line\"\t2\nok\t1\nnope\t9\n",
        )
        .unwrap();
        assert!(matches!(
            read_training_file(&path, TextEncoding::Utf8),
            Err(ArrError::InvalidScore { line: 5, .. })
        ));

        fs::write(&path, "text\tscore\n\"first line\nsecond line\"\t2\nok\t1\n").unwrap();
        let rows = read_training_file(&path, TextEncoding::Utf8).unwrap();
        assert_eq!(
            rows,
            vec![
                LabeledExample::new("first line\nsecond line", ScoreBand::Two),
                LabeledExample::new("ok", ScoreBand::One),
            ]
        );
    }

    #[test]
    fn test_prediction_log_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ARR_de_prompt1.tsv");
        let rows = vec![
            ScoredBurst {
                text: "Zelle Licht".into(),
                predicted: ScoreBand::Zero,
            },
            ScoredBurst {
                text: "say \"hi\"".into(),
                predicted: ScoreBand::Two,
            },
            ScoredBurst {
                text: "line one\nline two".into(),
                predicted: ScoreBand::Three,
            },
        ];
        write_prediction_log(&path, &rows).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("Zelle Licht\t0\n"));
        assert_eq!(read_prediction_log(&path).unwrap(), rows);
    }
}
