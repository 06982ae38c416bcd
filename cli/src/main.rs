// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

//! # Magpie Review CLI
//!
//! Multi-agent pull request review from the command line.
//!
//! ## Commands
//!
//! - `magpie review [DIFF]` - review a unified diff from a file or stdin
//! - `magpie pr <OWNER> <REPO> <NUMBER>` - fetch a GitHub PR diff and review it
//! - `magpie agents` - list the built-in review agents

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use magpie_cli::commands::{self, PrArgs, ReviewArgs};
use magpie_core::domain::ReviewConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Magpie Review - parallel multi-agent code review
#[derive(Parser)]
#[command(name = "magpie")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "MAGPIE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "MAGPIE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review a unified diff from a file or stdin
    Review(ReviewArgs),

    /// Fetch a GitHub pull request diff and review it
    Pr(PrArgs),

    /// List the built-in review agents
    Agents,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap resolves env-backed arguments
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ReviewConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ReviewConfig::default(),
    };

    match cli.command {
        Commands::Review(args) => commands::review::run(args, config).await,
        Commands::Pr(args) => commands::pr::run(args, config).await,
        Commands::Agents => {
            commands::list_agents();
            Ok(())
        }
    }
}
