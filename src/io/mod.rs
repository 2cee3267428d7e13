//! File formats read and written by burstarr
//!
//! - `tsv` - quote-aware delimited records
//! - `corpus` - training rows, burst corpora, prediction logs
//! - `reports` - evaluation records and sweep aggregates (CSV, JSON)

mod corpus;
mod reports;
mod tsv;

pub use corpus::{
    burst_file_name, prediction_log_name, read_adversarial_file, read_prediction_log,
    read_training_file, render_burst_corpus, training_file_name, write_burst_corpus,
    write_prediction_log, ADVERSARIAL_TEXT_COLUMN, BURST_HEADER,
};
pub use reports::{
    excerpt_file_name, render_excerpts, render_json, render_pivoted, render_pos_ratio,
    render_record, render_score_distribution, render_standard, JSON_REPORT_FILE,
    PIVOTED_REPORT_FILE, POS_RATIO_FILE, SCORE_DISTRIBUTION_FILE, SINGLE_RECORD_FILE,
    STANDARD_REPORT_FILE,
};
pub use tsv::{join_record, quote_field, split_record, split_records, Table, COMMA, TAB};

use anyhow::{Context, Result};
use std::path::Path;

/// Write a rendered report, creating parent directories.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    corpus::write_creating_dirs(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}
