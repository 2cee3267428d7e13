//! CLI command definitions and handlers

mod burst;
mod clean;
mod evaluate;
mod excerpts;
mod pos_ratio;
mod sweep;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::load_config;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// burstarr - content-burst attacks on automated answer scoring
#[derive(Parser, Debug)]
#[command(name = "burstarr")]
#[command(
    version,
    about = "Generate content-burst adversarials and measure how often a scoring model rejects them",
    long_about = "burstarr builds noun-frequency content bursts from tagged prompt texts, \
trains an SVM answer-scoring model per (language, prompt), cross-validates it with \
quadratic weighted kappa, and reports the Adversarial Rejection Rate (ARR): the share \
of bursts the model scores 0.",
    after_help = "\
Examples:
  burstarr burst --tags results/prompt_tags/Prompt1_de.tsv   Generate 1000 bursts
  burstarr evaluate --language de --prompt 1 --echo          ARR + QWK for one combination
  burstarr sweep                                             All configured combinations
  burstarr excerpts                                          Review excerpts per score band
  burstarr clean results/burst_attack_txt --ext tsv          Remove generated corpora"
)]
pub struct Cli {
    /// Config file (default: ./burstarr.toml, then ~/.config/burstarr/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, default_value = "8", value_parser = parse_workers)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a content-burst corpus from a pre-tagged prompt text
    #[command(after_help = "\
Examples:
  burstarr burst --tags tags/Prompt1_en.tsv --suffix orig300   Writes Prompt1_en_orig300_burst_result.tsv
  burstarr burst --tags tags/Prompt2_fr.tsv --amount 50 --seed 7")]
    Burst {
        /// Pre-tagged TSV (token<TAB>TAG per line)
        #[arg(long)]
        tags: PathBuf,

        /// EssaySet column value (default: tag file stem)
        #[arg(long)]
        prompt_id: Option<String>,

        /// Extends the output file name, e.g. `orig300`
        #[arg(long)]
        suffix: Option<String>,

        /// Number of bursts (default: config burst_amount)
        #[arg(long)]
        amount: Option<usize>,

        /// Minimum sentence length in characters (default: config target_length)
        #[arg(long)]
        target_length: Option<usize>,

        /// RNG seed (default: config seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory (default: config paths.burst_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Evaluate one (language, prompt) combination
    Evaluate {
        /// Language code: en, de, es, fr or an English variant like en_orig300
        #[arg(long, short = 'l', default_value = "de")]
        language: String,

        /// Prompt number
        #[arg(long, short = 'p', default_value = "1")]
        prompt: u32,

        /// Print the record as a table
        #[arg(long, short = 'e')]
        echo: bool,
    },

    /// Evaluate every configured combination in parallel
    Sweep {
        /// Hide the progress bar
        #[arg(long, short = 'q')]
        quiet: bool,

        /// Print the full report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Collect review excerpts and the score distribution from prediction logs
    Excerpts,

    /// Count nouns vs. other tokens for every tag file
    PosRatio,

    /// Remove files from a results directory
    Clean {
        /// Directory to empty
        dir: PathBuf,

        /// Only remove files with this extension
        #[arg(long)]
        ext: Option<String>,

        /// List files without removing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show version info
    Version,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Burst {
            tags,
            prompt_id,
            suffix,
            amount,
            target_length,
            seed,
            out,
        } => {
            let config = load_config(cli.config.as_deref())?;
            burst::run(
                &config,
                burst::BurstArgs {
                    tags,
                    prompt_id,
                    suffix,
                    amount,
                    target_length,
                    seed,
                    out,
                },
            )
        }

        Commands::Evaluate {
            language,
            prompt,
            echo,
        } => {
            let config = load_config(cli.config.as_deref())?;
            evaluate::run(&config, &language, prompt, echo)
        }

        Commands::Sweep { quiet, json } => {
            let config = load_config(cli.config.as_deref())?;
            sweep::run(&config, cli.workers, quiet, json)
        }

        Commands::Excerpts => {
            let config = load_config(cli.config.as_deref())?;
            excerpts::run(&config)
        }

        Commands::PosRatio => {
            let config = load_config(cli.config.as_deref())?;
            pos_ratio::run(&config)
        }

        Commands::Clean { dir, ext, dry_run } => clean::run(&dir, ext.as_deref(), dry_run),

        Commands::Version => {
            println!("burstarr {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
