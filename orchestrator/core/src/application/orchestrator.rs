// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! # Review Orchestrator
//!
//! Batch facade: resolve the agent set, fan out over the parallel
//! dispatcher, fold the results into one report. The caller always gets a
//! `Report` back — degraded when agents failed or timed out, explained in the
//! summary, but never an error from inside the batch.

use crate::application::aggregator::aggregate;
use crate::application::dispatcher::{dispatch, DispatchLimits};
use crate::application::registry::AgentRegistry;
use crate::domain::change::ChangeRecord;
use crate::domain::config::ReviewConfig;
use crate::domain::result::Report;
use crate::infrastructure::diff::parse_diff;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

pub struct ReviewOrchestrator {
    config: ReviewConfig,
    registry: AgentRegistry,
}

impl ReviewOrchestrator {
    pub fn new(config: ReviewConfig) -> Self {
        let registry = AgentRegistry::new(config.clone());
        Self { config, registry }
    }

    /// Parse a unified diff and review it.
    pub async fn review_diff(&self, diff_text: &str, selected: Option<&[String]>) -> Report {
        let changes = parse_diff(diff_text);
        info!(changes = changes.len(), "parsed diff");
        self.review_changes(changes, selected).await
    }

    /// Review a pre-parsed change set.
    ///
    /// Empty input short-circuits to an empty report without invoking any
    /// agent; an empty resolved agent set is "nothing to do", not an error.
    pub async fn review_changes(
        &self,
        changes: Vec<ChangeRecord>,
        selected: Option<&[String]>,
    ) -> Report {
        let review_id = Uuid::new_v4();

        if changes.is_empty() {
            info!(%review_id, "no code changes detected, skipping agents");
            return Report::empty("No code changes detected in diff");
        }

        let agents = self.registry.resolve(selected);
        if agents.is_empty() {
            warn!(%review_id, "no review agents enabled or selected");
            return Report::empty("No review agents enabled or selected");
        }

        let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
        info!(%review_id, agents = ?names, changes = changes.len(), "starting parallel review");

        let started = Instant::now();
        let results = dispatch(
            agents,
            Arc::new(changes),
            &DispatchLimits::from(&self.config),
        )
        .await;
        let elapsed = started.elapsed();

        let successful = results.iter().filter(|r| r.succeeded()).count();
        info!(
            %review_id,
            elapsed_ms = elapsed.as_millis() as u64,
            successful,
            total = results.len(),
            "parallel review completed"
        );
        for result in results.iter().filter(|r| !r.succeeded()) {
            warn!(
                %review_id,
                agent = %result.agent_name,
                error = result.error.as_deref().unwrap_or("unknown"),
                "agent did not complete"
            );
        }

        aggregate(&results, &self.config, elapsed)
    }
}
