//! Excerpts command - review samples per band and the score distribution

use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;

use crate::config::SweepConfig;
use crate::evaluation::{prompt_display_name, ExcerptCollector};
use crate::io::{
    excerpt_file_name, read_prediction_log, render_excerpts, render_score_distribution,
    write_report, SCORE_DISTRIBUTION_FILE,
};
use crate::models::ScoreBand;

pub(super) fn run(config: &SweepConfig) -> Result<()> {
    let dir = &config.paths.predictions_dir;
    let mut logs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "tsv"))
        .collect();
    logs.sort();

    if logs.is_empty() {
        println!("No prediction logs found in {}.", dir.display());
        return Ok(());
    }

    let mut collector = ExcerptCollector::new();
    for path in &logs {
        let rows = read_prediction_log(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        collector.add_log(prompt_display_name(&stem), &rows);
    }
    tracing::info!(logs = logs.len(), "processed prediction logs");

    let out = &config.paths.excerpt_dir;
    for band in ScoreBand::ALL {
        write_report(&out.join(excerpt_file_name(band)), &render_excerpts(&collector, band))?;
    }
    let distribution = collector.distribution();
    write_report(
        &out.join(SCORE_DISTRIBUTION_FILE),
        &render_score_distribution(&distribution),
    )?;

    println!("Processed {} prediction logs", style(logs.len()).cyan());
    for band in ScoreBand::ALL {
        println!("  Score {}: {}", band, style(distribution.count(band)).cyan());
    }
    println!("  Saved: {}", style(out.display()).dim());
    Ok(())
}
