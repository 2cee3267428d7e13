//! Burst command - generate one content-burst corpus

use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;

use crate::burst::{BurstGenerator, NounFrequencyTable};
use crate::config::SweepConfig;
use crate::io::{burst_file_name, write_burst_corpus};
use crate::tagging::parse_tagged_tsv;

#[derive(Debug)]
pub(super) struct BurstArgs {
    pub tags: PathBuf,
    pub prompt_id: Option<String>,
    pub suffix: Option<String>,
    pub amount: Option<usize>,
    pub target_length: Option<usize>,
    pub seed: Option<u64>,
    pub out: Option<PathBuf>,
}

pub(super) fn run(config: &SweepConfig, args: BurstArgs) -> Result<()> {
    let content = config
        .encodings
        .tags
        .read_to_string(&args.tags)
        .with_context(|| format!("Failed to read tags {}", args.tags.display()))?;
    let tokens = parse_tagged_tsv(&content)
        .with_context(|| format!("Malformed tag file {}", args.tags.display()))?;
    let table = NounFrequencyTable::from_tokens(&tokens)?;

    let stem = args
        .tags
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "prompt".to_string());
    let prompt_id = args.prompt_id.unwrap_or_else(|| stem.clone());

    let bursts = BurstGenerator::new(args.seed.unwrap_or(config.seed))
        .with_target_length(args.target_length.unwrap_or(config.target_length))
        .with_max_rejections(config.max_rejections)
        .generate_dataset(&table, args.amount.unwrap_or(config.burst_amount), &prompt_id)?;

    let out_dir = args.out.unwrap_or_else(|| config.paths.burst_dir.clone());
    let path = out_dir.join(burst_file_name(&stem, args.suffix.as_deref()));
    write_burst_corpus(&path, &bursts, &config.id_prefix)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "Generated {} bursts from {} nouns",
        style(bursts.len()).cyan(),
        style(table.len()).cyan()
    );
    if let Some(first) = bursts.first() {
        println!("  First: {}", style(&first.text).dim());
    }
    println!("  Saved: {}", style(path.display()).green());
    Ok(())
}
