// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

pub mod change;
pub mod finding;
pub mod agent;
pub mod result;
pub mod config;
pub mod llm;

pub use agent::{AgentError, ReviewAgent};
pub use change::ChangeRecord;
pub use config::ReviewConfig;
pub use finding::{Finding, Severity};
pub use result::{AgentOutcome, AgentResult, MergedFinding, Report, ReviewSummary};
