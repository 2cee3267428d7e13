//! Clean command - empty a results directory

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Files directly inside `dir`, optionally only those with extension `ext`.
pub(super) fn collect(dir: &Path, ext: Option<&str>) -> Result<Vec<PathBuf>> {
    let ext = ext.map(|e| e.trim_start_matches('.'));
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| match ext {
            Some(ext) => p.extension().is_some_and(|e| e == ext),
            None => true,
        })
        .collect();
    found.sort();
    Ok(found)
}

pub(super) fn run(dir: &Path, ext: Option<&str>, dry_run: bool) -> Result<()> {
    let found = collect(dir, ext)?;

    if found.is_empty() {
        println!("No files to remove in {}.", dir.display());
        return Ok(());
    }

    println!(
        "Found {} file{}:",
        found.len(),
        if found.len() == 1 { "" } else { "s" }
    );
    for file in &found {
        println!("  {}", file.display());
    }

    if dry_run {
        println!("\nDry run - nothing removed. Run without --dry-run to delete.");
        return Ok(());
    }

    println!();
    let mut removed = 0;
    for file in &found {
        match std::fs::remove_file(file) {
            Ok(_) => removed += 1,
            Err(e) => eprintln!("Failed to remove {}: {}", file.display(), e),
        }
    }

    println!(
        "Cleaned {} file{}.",
        removed,
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}
