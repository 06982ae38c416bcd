// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! The uniform review contract every analysis agent implements.
//!
//! Agents are replaceable units: the dispatcher knows nothing about what
//! happens inside `review` beyond "it returns findings or an error". Internal
//! sub-batching, remote calls, and retries are the agent's own business.

use crate::domain::change::ChangeRecord;
use crate::domain::finding::Finding;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("analysis backend error: {0}")]
    Backend(String),

    #[error("unparseable analysis response: {0}")]
    InvalidResponse(String),
}

/// An independent analysis agent reviewing a shared change set.
///
/// `review` must not fail for routine "no issues found" — that is an empty
/// `Vec`. An `Err` means genuine operational failure and is converted into a
/// failed result by the task runner, never propagated to the batch caller.
#[async_trait]
pub trait ReviewAgent: Send + Sync {
    /// Stable agent name, used for attribution and logging.
    fn name(&self) -> &str;

    async fn review(&self, changes: &[ChangeRecord]) -> Result<Vec<Finding>, AgentError>;
}

impl std::fmt::Debug for dyn ReviewAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewAgent").field("name", &self.name()).finish()
    }
}
