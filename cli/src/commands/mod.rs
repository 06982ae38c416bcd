// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

pub mod review;
pub mod pr;

pub use self::pr::PrArgs;
pub use self::review::ReviewArgs;

use anyhow::{Context, Result};
use magpie_core::application::AgentKind;
use magpie_core::domain::{ReviewConfig, Severity};
use std::time::Duration;

/// Flag overrides shared by the review-producing commands.
#[derive(Debug, Clone, clap::Args)]
pub struct CommonArgs {
    /// Agents to run, comma-separated (default: config-enabled set)
    #[arg(short, long, value_delimiter = ',', value_name = "NAME")]
    pub agents: Vec<String>,

    /// Per-agent timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Minimum severity to report (critical, major, minor, info)
    #[arg(long, value_name = "LEVEL")]
    pub min_severity: Option<String>,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<std::path::PathBuf>,

    /// Also save a timestamped copy under output/
    #[arg(long)]
    pub save: bool,
}

impl CommonArgs {
    pub fn apply(&self, config: &mut ReviewConfig) -> Result<()> {
        if let Some(secs) = self.timeout {
            config.agent_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = &self.min_severity {
            config.min_severity = level
                .parse::<Severity>()
                .with_context(|| format!("invalid --min-severity '{level}'"))?;
        }
        Ok(())
    }

    /// Explicit selection, or `None` for the config default set.
    pub fn selection(&self) -> Option<&[String]> {
        if self.agents.is_empty() {
            None
        } else {
            Some(&self.agents)
        }
    }
}

pub fn list_agents() {
    for kind in AgentKind::ALL {
        println!("{}", kind.agent_name());
    }
}
