//! CLI contract tests
//!
//! Runs the built binary against a temp results tree described by a
//! generated burstarr.toml.

use std::fs;
use std::path::Path;
use std::process::Command;

fn burstarr_bin() -> &'static str {
    env!("CARGO_BIN_EXE_burstarr")
}

fn write_config(root: &Path) -> std::path::PathBuf {
    let config = format!(
        r#"
burst_amount = 12
folds = 3
languages = ["de", "xx"]
prompts = [2]

[paths]
tags_dir = {:?}
training_dir = {:?}
burst_dir = {:?}
predictions_dir = {:?}
excerpt_dir = {:?}
report_dir = {:?}

[encodings]
adversarial = "utf-8"
"#,
        root.join("tags"),
        root.join("training"),
        root.join("bursts"),
        root.join("predictions"),
        root.join("excerpts"),
        root.join("reports"),
    );
    let path = root.join("burstarr.toml");
    fs::write(&path, config).unwrap();

    fs::create_dir_all(root.join("tags")).unwrap();
    fs::write(
        root.join("tags").join("Prompt2_de.tsv"),
        "Zelle\tNOUN\nteilt\tVERB\nsich\tPRON\nKern\tNOUN\nZelle\tNOUN\n",
    )
    .unwrap();

    fs::create_dir_all(root.join("training")).unwrap();
    let mut training = String::from("text\tscore\n");
    for i in 0..12 {
        let (text, score) = match i % 3 {
            0 => ("", 0),
            1 => ("Zelle", 1),
            _ => ("Die Zelle teilt den Kern", 2),
        };
        training.push_str(&format!("{}\t{}\n", text, score));
    }
    fs::write(root.join("training").join("ASAP_de_prompt2.tsv"), training).unwrap();

    path
}

fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(burstarr_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("BURSTARR_SEED")
        .output()
        .unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn version_prints_package_version() {
    let (code, stdout, _) = run(&["version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn burst_command_writes_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path());
    let out = dir.path().join("out");
    let tags = dir.path().join("tags").join("Prompt2_de.tsv");

    let (code, _, stderr) = run(&[
        "--config",
        cfg.to_str().unwrap(),
        "burst",
        "--tags",
        tags.to_str().unwrap(),
        "--amount",
        "5",
        "--suffix",
        "test",
        "--out",
        out.to_str().unwrap(),
    ]);
    assert_eq!(code, 0, "stderr: {}", stderr);

    let corpus = fs::read_to_string(out.join("Prompt2_de_test_burst_result.tsv")).unwrap();
    assert_eq!(corpus.lines().count(), 6);
}

#[test]
fn sweep_json_reports_partial_failure() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path());

    let (code, stdout, stderr) = run(&["--config", cfg.to_str().unwrap(), "--workers", "2", "sweep", "--json"]);
    assert_eq!(code, 0, "stderr: {}", stderr);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["status"], "completed");
    assert_eq!(outcomes[1]["status"], "failed");
    assert_eq!(outcomes[1]["kind"], "UnsupportedLanguageError");

    let pivoted = fs::read_to_string(
        dir.path()
            .join("reports")
            .join("content_bursts_arr_results_pivoted.csv"),
    )
    .unwrap();
    assert!(pivoted.starts_with("Language Prompt,ARR,QWK,STATUS\nde prompt2,"));

    // excerpts work off the prediction logs the sweep left behind
    let (code, _, stderr) = run(&["--config", cfg.to_str().unwrap(), "excerpts"]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    let distribution =
        fs::read_to_string(dir.path().join("excerpts").join("score_distribution.csv")).unwrap();
    let total: usize = distribution
        .lines()
        .skip(1)
        .map(|l| l.split(',').nth(1).unwrap().parse::<usize>().unwrap())
        .sum();
    assert_eq!(total, 12);
}

#[test]
fn sweep_fails_when_every_combination_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path());
    fs::remove_file(dir.path().join("tags").join("Prompt2_de.tsv")).unwrap();

    let (code, _, _) = run(&["--config", cfg.to_str().unwrap(), "sweep", "--quiet"]);
    assert_ne!(code, 0);
}

#[test]
fn zero_workers_rejected() {
    let (code, _, stderr) = run(&["--workers", "0", "version"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("workers must be at least 1"));
}
