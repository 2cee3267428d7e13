//! Evaluate command - ARR and QWK for a single combination

use anyhow::Result;
use console::style;

use crate::config::SweepConfig;
use crate::io::{render_record, write_report, SINGLE_RECORD_FILE};
use crate::models::CombinationKey;
use crate::sweep::run_combination;

pub(super) fn run(config: &SweepConfig, language: &str, prompt: u32, echo: bool) -> Result<()> {
    let key = CombinationKey::new(language, prompt);
    println!(
        "Evaluating language {} prompt {}",
        style(&key.language).cyan(),
        style(prompt).cyan()
    );

    let result = run_combination(config, &key)?;

    let path = config.paths.report_dir.join(SINGLE_RECORD_FILE);
    write_report(&path, &render_record(&result.record, result.qwk))?;

    if echo {
        let rows = [
            ("METHOD", result.record.method.clone()),
            ("LANGUAGE", result.record.language.clone()),
            ("PROMPT", result.record.prompt_id.clone()),
            ("PROMPT_NUMBER", result.record.prompt_number.to_string()),
            ("ARR", format!("{:.3}", result.record.arr)),
            ("QWK", format!("{:.2}", result.qwk)),
        ];
        println!();
        println!("  {:<15} {}", style("Key").bold(), style("Value").bold());
        for (k, v) in rows {
            println!("  {:<15} {}", k, v);
        }
        println!();
    }

    println!(
        "ARR {} (QWK {}) for {}",
        style(format!("{:.3}", result.record.arr)).green().bold(),
        style(format!("{:.2}", result.qwk)).cyan(),
        key
    );
    println!("  Saved: {}", style(path.display()).dim());
    println!("  Predictions: {}", style(result.paths.predictions.display()).dim());
    Ok(())
}
