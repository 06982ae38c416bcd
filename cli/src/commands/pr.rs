// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! `magpie pr` - fetch a GitHub pull request diff and review it.

use crate::commands::CommonArgs;
use crate::github::GitHubClient;
use crate::output;
use anyhow::{bail, Result};
use clap::Args;
use magpie_core::application::ReviewOrchestrator;
use magpie_core::domain::ReviewConfig;

#[derive(Debug, Args)]
pub struct PrArgs {
    /// Repository owner, e.g. `rust-lang`
    pub owner: String,

    /// Repository name, e.g. `cargo`
    pub repo: String,

    /// Pull request number
    pub number: u64,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run(args: PrArgs, mut config: ReviewConfig) -> Result<()> {
    args.common.apply(&mut config)?;

    let client = GitHubClient::new(args.token.clone())?;
    let diff_text = client.pr_diff(&args.owner, &args.repo, args.number).await?;
    if diff_text.trim().is_empty() {
        bail!("pull request #{} has an empty diff", args.number);
    }

    let orchestrator = ReviewOrchestrator::new(config);
    let report = orchestrator.review_diff(&diff_text, args.common.selection()).await;

    let label = format!("pr_{}", args.number);
    output::emit(&report, args.common.output.as_deref(), args.common.save, &label)
}
