// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! `magpie review` - review a unified diff from a file or stdin.

use crate::commands::CommonArgs;
use crate::output;
use anyhow::{bail, Context, Result};
use clap::Args;
use magpie_core::application::ReviewOrchestrator;
use magpie_core::domain::ReviewConfig;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Path to a unified diff file; omit or use '-' to read stdin
    #[arg(value_name = "DIFF")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: ReviewArgs, mut config: ReviewConfig) -> Result<()> {
    args.common.apply(&mut config)?;

    let diff_text = read_diff(args.file.as_deref())?;
    if diff_text.trim().is_empty() {
        bail!("diff is empty");
    }

    let orchestrator = ReviewOrchestrator::new(config);
    let report = orchestrator.review_diff(&diff_text, args.common.selection()).await;

    output::emit(&report, args.common.output.as_deref(), args.common.save, "diff")
}

fn read_diff(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read diff from {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read diff from stdin")?;
            Ok(buffer)
        }
    }
}
