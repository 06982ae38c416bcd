// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! Outcome-tagged execution results and the aggregated report model.
//!
//! Every agent execution produces exactly one [`AgentResult`], whatever
//! happened inside it — completion, operational failure, panic, or timeout.
//! The dispatcher never relies on an unwound error to detect failure; the
//! outcome tag is the only control-flow channel.

use crate::domain::finding::{Finding, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentOutcome {
    Completed,
    Failed,
    TimedOut,
}

/// Result of one agent execution. Immutable after creation; consumed by the
/// aggregator and by report metadata.
#[derive(Debug, Clone)]
pub struct AgentResult {
    pub agent_name: String,

    /// Findings the agent produced. Empty unless the outcome is `Completed`:
    /// partial findings from a failed agent are discarded (one policy,
    /// applied everywhere, so arrival order can never leak partial data).
    pub findings: Vec<Finding>,

    /// Wall-clock duration of the execution, recorded for every outcome.
    pub duration: Duration,

    pub outcome: AgentOutcome,

    /// Present iff outcome is not `Completed`.
    pub error: Option<String>,
}

impl AgentResult {
    pub fn completed(agent_name: impl Into<String>, findings: Vec<Finding>, duration: Duration) -> Self {
        Self {
            agent_name: agent_name.into(),
            findings,
            duration,
            outcome: AgentOutcome::Completed,
            error: None,
        }
    }

    pub fn failed(agent_name: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            agent_name: agent_name.into(),
            findings: Vec::new(),
            duration,
            outcome: AgentOutcome::Failed,
            error: Some(error.into()),
        }
    }

    pub fn timed_out(agent_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent_name: agent_name.into(),
            findings: Vec::new(),
            duration: timeout,
            outcome: AgentOutcome::TimedOut,
            error: Some(format!("agent exceeded {}s timeout", timeout.as_secs())),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == AgentOutcome::Completed
    }
}

/// Batch-level statistics for the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total_comments: usize,
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
    pub info: usize,
    pub message: String,
    pub elapsed_seconds: f64,
    pub successful_agents: usize,
    pub total_agents: usize,

    /// Merged entries dropped by the per-file cap; 0 when nothing was cut.
    #[serde(default)]
    pub truncated: usize,
}

impl ReviewSummary {
    /// Summary for a batch that never ran any agent.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            total_comments: 0,
            critical: 0,
            major: 0,
            minor: 0,
            info: 0,
            message: message.into(),
            elapsed_seconds: 0.0,
            successful_agents: 0,
            total_agents: 0,
            truncated: 0,
        }
    }
}

/// A finding consolidated across every line where the same agent reported the
/// same message within one file/severity bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedFinding {
    pub agent: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Ordered, duplicate-free list of line numbers sharing this message
    pub lines: Vec<u32>,
}

/// Per-agent execution metadata carried alongside the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRunStats {
    pub name: String,
    pub duration_seconds: f64,
    pub outcome: AgentOutcome,
    pub comments_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&AgentResult> for AgentRunStats {
    fn from(result: &AgentResult) -> Self {
        Self {
            name: result.agent_name.clone(),
            duration_seconds: result.duration.as_secs_f64(),
            outcome: result.outcome,
            comments_found: result.findings.len(),
            error: result.error.clone(),
        }
    }
}

/// The aggregated review for one batch. Built once, immutable once returned.
///
/// `BTreeMap` keys re-impose a deterministic order (file name, then severity
/// urgency) so two runs over the same inputs produce structurally identical
/// reports even when wall-clock completion order differed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: ReviewSummary,
    pub files: BTreeMap<String, BTreeMap<Severity, Vec<MergedFinding>>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentRunStats>,
}

impl Report {
    /// Report for a batch with nothing to review or nothing to run.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            summary: ReviewSummary::empty(message),
            files: BTreeMap::new(),
            agents: Vec::new(),
        }
    }
}
