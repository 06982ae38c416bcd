// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! Report rendering: JSON emission and the colored terminal summary.

use anyhow::{Context, Result};
use colored::Colorize;
use magpie_core::domain::Report;
use std::path::Path;

/// Writes the report according to the output flags.
///
/// With `--output FILE` the pretty JSON goes to that file and a colored
/// summary is printed to stdout. Without it the JSON itself goes to stdout
/// so the command stays pipeable. `--save` additionally drops a timestamped
/// copy under `output/`.
pub fn emit(report: &Report, output: Option<&Path>, save: bool, label: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;

    if save {
        let path = save_report(&json, label, Path::new("output"))?;
        eprintln!("Saved report to {}", path.display());
    }

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            print_summary(report);
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn save_report(json: &str, label: &str, dir: &Path) -> Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir).context("failed to create output directory")?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{label}_review_{timestamp}.json"));
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(path)
}

fn print_summary(report: &Report) {
    let summary = &report.summary;
    println!("{}", summary.message.bold());
    if summary.total_comments == 0 {
        return;
    }

    println!(
        "  {} critical, {} major, {} minor, {} info",
        summary.critical.to_string().red().bold(),
        summary.major.to_string().yellow(),
        summary.minor.to_string().cyan(),
        summary.info.to_string().dimmed(),
    );
    if summary.truncated > 0 {
        println!(
            "  {}",
            format!("{} finding(s) omitted by the per-file cap", summary.truncated).dimmed()
        );
    }
    println!(
        "  {} file(s) flagged, {}/{} agents completed in {:.1}s",
        report.files.len(),
        summary.successful_agents,
        summary.total_agents,
        summary.elapsed_seconds,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::domain::Report;

    #[test]
    fn test_emit_writes_pretty_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = Report::empty("No code changes detected in diff");

        emit(&report, Some(&path), false, "diff").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["summary"]["total_comments"], 0);
    }

    #[test]
    fn test_save_report_uses_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();

        let path = save_report("{}", "pr_42", dir.path()).unwrap();

        assert!(path.starts_with(dir.path()));
        assert!(path.is_file());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("pr_42_review_"));
        assert!(name.ends_with(".json"));
    }
}
