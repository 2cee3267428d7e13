//! Evaluation reports: single records, sweep aggregates, excerpts, POS ratios
//!
//! Floats are written in shortest round-trip form (`1.0`, `0.999`), QWK
//! rounded to two places.

use anyhow::Result;

use super::tsv::{join_record, COMMA};
use crate::evaluation::{ExcerptCollector, ScoreDistribution};
use crate::models::{ArrRecord, ScoreBand};
use crate::sweep::{CombinationOutcome, SweepReport};
use crate::tagging::PosCounts;

pub const STANDARD_REPORT_FILE: &str = "content_bursts_arr_results.csv";
pub const PIVOTED_REPORT_FILE: &str = "content_bursts_arr_results_pivoted.csv";
pub const JSON_REPORT_FILE: &str = "content_bursts_arr_results.json";
pub const SINGLE_RECORD_FILE: &str = "single_save_file.csv";
pub const SCORE_DISTRIBUTION_FILE: &str = "score_distribution.csv";
pub const POS_RATIO_FILE: &str = "noun_none_noun_distribution.csv";

fn float(value: f64) -> String {
    format!("{:?}", value)
}

fn qwk(value: f64) -> String {
    float((value * 100.0).round() / 100.0)
}

fn push_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    out.push_str(&join_record(fields, COMMA));
    out.push('\n');
}

/// `arr_excerpt_score_<band>.csv`
pub fn excerpt_file_name(band: ScoreBand) -> String {
    format!("arr_excerpt_score_{}.csv", band)
}

/// One evaluation record with its cross-validated kappa.
pub fn render_record(record: &ArrRecord, kappa: f64) -> String {
    let mut out = String::new();
    push_row(&mut out, &["METHOD", "LANGUAGE", "PROMPT", "PROMPT_NUMBER", "ARR", "QWK"]);
    push_row(
        &mut out,
        &[
            record.method.clone(),
            record.language.clone(),
            record.prompt_id.clone(),
            record.prompt_number.to_string(),
            float(record.arr),
            qwk(kappa),
        ],
    );
    out
}

/// Metrics as rows, one column per combination. Failed columns are empty.
pub fn render_standard(report: &SweepReport) -> String {
    let mut header = vec!["EVALUATION METRIC".to_string()];
    let mut arr = vec!["ARR".to_string()];
    let mut kappa = vec!["QWK".to_string()];

    for outcome in &report.outcomes {
        header.push(outcome.key().label());
        match outcome.result() {
            Some(result) => {
                arr.push(float(result.record.arr));
                kappa.push(qwk(result.qwk));
            }
            None => {
                arr.push(String::new());
                kappa.push(String::new());
            }
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header);
    push_row(&mut out, &arr);
    push_row(&mut out, &kappa);
    out
}

/// One row per combination, with a status column.
pub fn render_pivoted(report: &SweepReport) -> String {
    let mut out = String::new();
    push_row(&mut out, &["Language Prompt", "ARR", "QWK", "STATUS"]);
    for outcome in &report.outcomes {
        let name = outcome.key().label().replace('_', " ");
        let row = match outcome {
            CombinationOutcome::Completed(result) => {
                [name, float(result.record.arr), qwk(result.qwk), "ok".to_string()]
            }
            CombinationOutcome::Failed { kind, message, .. } => [
                name,
                String::new(),
                String::new(),
                format!("{}: {}", kind, message),
            ],
        };
        push_row(&mut out, &row);
    }
    out
}

pub fn render_json(report: &SweepReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Excerpts of one band across every prompt, `/` for prompts without any.
pub fn render_excerpts(collector: &ExcerptCollector, band: ScoreBand) -> String {
    let mut out = String::new();
    let score_header = format!("Score {}", band);
    push_row(&mut out, &["Example Id", "Prompt Type", score_header.as_str()]);
    for prompt in collector.prompts() {
        let sentences = prompt.sample.band(band);
        if sentences.is_empty() {
            push_row(&mut out, &["/", prompt.prompt.as_str(), "/"]);
        }
        for (i, sentence) in sentences.iter().enumerate() {
            push_row(
                &mut out,
                &[(i + 1).to_string(), prompt.prompt.clone(), sentence.clone()],
            );
        }
    }
    out
}

pub fn render_score_distribution(distribution: &ScoreDistribution) -> String {
    let mut out = String::new();
    push_row(&mut out, &["Score", "Count"]);
    for band in ScoreBand::ALL {
        push_row(&mut out, &[band.to_string(), distribution.count(band).to_string()]);
    }
    out
}

/// Noun / non-noun counts per prompt, prompts in descending order.
pub fn render_pos_ratio(rows: &[(String, PosCounts)]) -> String {
    let mut sorted: Vec<&(String, PosCounts)> = rows.iter().collect();
    sorted.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out = String::new();
    push_row(&mut out, &["Prompt", "NOUN", "NONE_NOUN", "TOTAL"]);
    for (prompt, counts) in sorted {
        push_row(
            &mut out,
            &[
                prompt.clone(),
                counts.noun.to_string(),
                counts.non_noun.to_string(),
                counts.total.to_string(),
            ],
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ScoreTally;
    use crate::models::{CombinationKey, ScoredBurst};
    use crate::scoring::FitSummary;
    use crate::sweep::{CombinationPaths, CombinationResult};
    use chrono::Utc;
    use std::path::PathBuf;

    fn completed(language: &str, prompt: u32, arr: f64, kappa: f64) -> CombinationOutcome {
        let key = CombinationKey::new(language, prompt);
        CombinationOutcome::Completed(CombinationResult {
            record: ArrRecord {
                method: "CONTENT_BURST".into(),
                prompt_id: key.prompt_id(),
                prompt_number: prompt,
                language: language.into(),
                arr,
            },
            key,
            qwk: kappa,
            fold_kappas: vec![kappa],
            fit: FitSummary {
                examples: 10,
                n_features: 100,
                classes: vec![ScoreBand::Zero, ScoreBand::One],
                support_vectors: 4,
            },
            tally: ScoreTally::default(),
            vocabulary: 3,
            paths: CombinationPaths {
                tags: PathBuf::new(),
                training: PathBuf::new(),
                bursts: PathBuf::new(),
                predictions: PathBuf::new(),
            },
        })
    }

    fn report() -> SweepReport {
        SweepReport {
            generated_at: Utc::now(),
            method: "CONTENT_BURST".into(),
            outcomes: vec![
                completed("en", 1, 0.999, 0.5234),
                completed("en", 2, 1.0, 0.149),
                CombinationOutcome::Failed {
                    key: CombinationKey::new("it", 1),
                    kind: "UnsupportedLanguageError".into(),
                    message: "unsupported language 'it'".into(),
                },
            ],
        }
    }

    #[test]
    fn test_standard_layout() {
        let out = render_standard(&report());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "EVALUATION METRIC,en_prompt1,en_prompt2,it_prompt1");
        assert_eq!(lines[1], "ARR,0.999,1.0,");
        assert_eq!(lines[2], "QWK,0.52,0.15,");
    }

    #[test]
    fn test_pivoted_layout() {
        let out = render_pivoted(&report());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Language Prompt,ARR,QWK,STATUS");
        assert_eq!(lines[1], "en prompt1,0.999,0.52,ok");
        assert!(lines[3].starts_with("it prompt1,,,UnsupportedLanguageError"));
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["outcomes"][0]["status"], "completed");
        assert_eq!(parsed["outcomes"][2]["status"], "failed");
        assert_eq!(parsed["outcomes"][2]["kind"], "UnsupportedLanguageError");
    }

    #[test]
    fn test_record_csv() {
        let record = ArrRecord {
            method: "CONTENT_BURST".into(),
            prompt_id: "ASAP_de_prompt1".into(),
            prompt_number: 1,
            language: "de".into(),
            arr: 0.75,
        };
        assert_eq!(
            render_record(&record, 0.876),
            "METHOD,LANGUAGE,PROMPT,PROMPT_NUMBER,ARR,QWK\nCONTENT_BURST,de,ASAP_de_prompt1,1,0.75,0.88\n"
        );
    }

    #[test]
    fn test_excerpt_csv_marks_empty_bands() {
        let mut collector = ExcerptCollector::new();
        collector.add_log(
            "de prompt1",
            &[ScoredBurst {
                text: "Zelle Licht".into(),
                predicted: ScoreBand::Zero,
            }],
        );
        let zero = render_excerpts(&collector, ScoreBand::Zero);
        assert_eq!(zero, "Example Id,Prompt Type,Score 0\n1,de prompt1,Zelle Licht\n");
        let three = render_excerpts(&collector, ScoreBand::Three);
        assert_eq!(three, "Example Id,Prompt Type,Score 3\n/,de prompt1,/\n");
        assert_eq!(excerpt_file_name(ScoreBand::Two), "arr_excerpt_score_2.csv");
    }

    #[test]
    fn test_pos_ratio_sorted_descending() {
        let rows = vec![
            ("Prompt1 de".to_string(), PosCounts { noun: 3, non_noun: 7, total: 10 }),
            ("Prompt2 de".to_string(), PosCounts { noun: 1, non_noun: 1, total: 2 }),
        ];
        let out = render_pos_ratio(&rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Prompt,NOUN,NONE_NOUN,TOTAL");
        assert_eq!(lines[1], "Prompt2 de,1,1,2");
        assert_eq!(lines[2], "Prompt1 de,3,7,10");
    }
}
