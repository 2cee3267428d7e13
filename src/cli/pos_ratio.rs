//! Pos-ratio command - noun vs. non-noun counts per prompt text

use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;
use tracing::warn;

use crate::config::SweepConfig;
use crate::io::{render_pos_ratio, write_report, POS_RATIO_FILE};
use crate::tagging::{parse_tagged_tsv, PosCounts};

pub(super) fn run(config: &SweepConfig) -> Result<()> {
    let dir = &config.paths.tags_dir;
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "tsv"))
        .collect();
    files.sort();

    let mut rows = Vec::with_capacity(files.len());
    for path in &files {
        let tokens = match config
            .encodings
            .tags
            .read_to_string(path)
            .and_then(|content| parse_tagged_tsv(&content))
        {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(path = %path.display(), "skipping tag file: {}", e);
                continue;
            }
        };
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().replace('_', " "))
            .unwrap_or_default();
        rows.push((name, PosCounts::from_tokens(&tokens)));
    }

    let path = config.paths.report_dir.join(POS_RATIO_FILE);
    write_report(&path, &render_pos_ratio(&rows))?;

    for (name, counts) in &rows {
        println!(
            "  {:<16} {:>6} nouns / {:>6} tokens ({:.1}%)",
            name,
            counts.noun,
            counts.total,
            counts.noun_ratio() * 100.0
        );
    }
    println!("  Saved: {}", style(path.display()).dim());
    Ok(())
}
