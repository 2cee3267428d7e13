//! Sweep command - every configured combination plus aggregate reports

use anyhow::{bail, Result};
use console::style;

use crate::config::SweepConfig;
use crate::io::{
    render_json, render_pivoted, render_standard, write_report, JSON_REPORT_FILE,
    PIVOTED_REPORT_FILE, STANDARD_REPORT_FILE,
};
use crate::sweep::{run_sweep, CombinationOutcome};

pub(super) fn run(config: &SweepConfig, workers: usize, quiet: bool, json: bool) -> Result<()> {
    let report = run_sweep(config, workers, !quiet && !json)?;

    let dir = &config.paths.report_dir;
    write_report(&dir.join(STANDARD_REPORT_FILE), &render_standard(&report))?;
    write_report(&dir.join(PIVOTED_REPORT_FILE), &render_pivoted(&report))?;
    let rendered = render_json(&report)?;
    write_report(&dir.join(JSON_REPORT_FILE), &rendered)?;

    if json {
        println!("{}", rendered);
    } else {
        for outcome in &report.outcomes {
            match outcome {
                CombinationOutcome::Completed(result) => println!(
                    "  {} {:<24} ARR {:.3}  QWK {:.2}",
                    style("[OK]").green(),
                    result.key.label(),
                    result.record.arr,
                    result.qwk
                ),
                CombinationOutcome::Failed { key, kind, .. } => println!(
                    "  {} {:<24} {}",
                    style("[!!]").red(),
                    key.label(),
                    style(kind).red()
                ),
            }
        }
        println!("\n  Reports: {}", style(dir.display()).dim());
    }

    if report.all_failed() {
        bail!("All {} combinations failed", report.outcomes.len());
    }
    Ok(())
}
