// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! # Parallel Dispatcher
//!
//! The concurrency core. Every selected agent is submitted to a bounded
//! worker pool as one independent unit of work against a shared read-only
//! change set. Results are collected in completion order, each agent carries
//! its own timeout, and the dispatcher blocks until every agent has settled —
//! the batch never returns a partial result set because one agent was slow.
//!
//! [`run_agent`] is the isolation boundary: it returns an [`AgentResult`]
//! under every condition and never throws. Panics are absorbed one level up
//! through the join handle, and a timed-out execution is detached — it may
//! keep running in the background, but its handle is owned by exactly one
//! dispatch slot, so a late result can never be attributed to another agent.

use crate::domain::agent::ReviewAgent;
use crate::domain::change::ChangeRecord;
use crate::domain::config::ReviewConfig;
use crate::domain::result::AgentResult;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Scheduling limits for one batch.
#[derive(Debug, Clone)]
pub struct DispatchLimits {
    /// Pool size; `None` means one worker per agent
    pub max_workers: Option<usize>,

    /// Timeout applied to each agent independently
    pub agent_timeout: Duration,
}

impl From<&ReviewConfig> for DispatchLimits {
    fn from(config: &ReviewConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            agent_timeout: config.agent_timeout,
        }
    }
}

/// Run a single agent with timing and error capture.
///
/// Policy: partial findings from a failed agent are discarded — a result
/// either carries everything a completed agent produced, or nothing.
pub async fn run_agent(agent: Arc<dyn ReviewAgent>, changes: Arc<Vec<ChangeRecord>>) -> AgentResult {
    let name = agent.name().to_string();
    let started = Instant::now();
    info!(agent = %name, changes = changes.len(), "starting analysis");

    match agent.review(&changes).await {
        Ok(findings) => {
            let duration = started.elapsed();
            info!(
                agent = %name,
                findings = findings.len(),
                elapsed_ms = duration.as_millis() as u64,
                "agent completed"
            );
            AgentResult::completed(name, findings, duration)
        }
        Err(err) => {
            let duration = started.elapsed();
            error!(agent = %name, elapsed_ms = duration.as_millis() as u64, "agent failed: {err}");
            AgentResult::failed(name, err.to_string(), duration)
        }
    }
}

/// Run every agent against the shared change set and wait for all of them to
/// settle. Exactly one [`AgentResult`] comes back per submitted agent, in
/// completion order.
pub async fn dispatch(
    agents: Vec<Arc<dyn ReviewAgent>>,
    changes: Arc<Vec<ChangeRecord>>,
    limits: &DispatchLimits,
) -> Vec<AgentResult> {
    if agents.is_empty() {
        return Vec::new();
    }

    let max_workers = limits.max_workers.unwrap_or(agents.len()).max(1);
    let agent_timeout = limits.agent_timeout;
    let pool = Arc::new(Semaphore::new(max_workers));

    let mut in_flight: FuturesUnordered<_> = agents
        .into_iter()
        .map(|agent| {
            let changes = Arc::clone(&changes);
            let pool = Arc::clone(&pool);
            async move {
                // The semaphore is never closed while dispatch is running.
                let _permit = pool.acquire_owned().await.expect("worker pool closed");
                let name = agent.name().to_string();

                // The timeout clock starts when a worker is acquired, not at
                // submission: a pool-capped agent is not penalised for queueing.
                let started = Instant::now();
                let handle = tokio::spawn(run_agent(agent, changes));
                match tokio::time::timeout(agent_timeout, handle).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => {
                        let reason = if join_err.is_panic() {
                            "agent panicked during review".to_string()
                        } else {
                            format!("agent task aborted: {join_err}")
                        };
                        error!(agent = %name, "{reason}");
                        AgentResult::failed(name, reason, started.elapsed())
                    }
                    Err(_elapsed) => {
                        // Dropping the handle detaches the execution; its
                        // eventual output, if any, is discarded.
                        warn!(agent = %name, timeout_s = agent_timeout.as_secs(), "agent timed out");
                        AgentResult::timed_out(name, agent_timeout)
                    }
                }
            }
        })
        .collect();

    let mut results = Vec::with_capacity(in_flight.len());
    while let Some(result) = in_flight.next().await {
        results.push(result);
    }
    results
}
