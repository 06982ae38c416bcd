// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Urgency of a finding. Declaration order is the total order: a variant is
/// strictly more urgent than every variant declared after it, so the derived
/// `Ord` gives `Critical < Major < Minor < Info` and "at least as urgent as"
/// is plain `<=`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Info => "info",
        }
    }

    /// True when `self` is at least as urgent as `floor`.
    pub fn at_least(&self, floor: Severity) -> bool {
        *self <= floor
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "major" => Ok(Severity::Major),
            "minor" => Ok(Severity::Minor),
            "info" => Ok(Severity::Info),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown severity level: {0}")]
pub struct UnknownSeverity(pub String);

/// One reported issue from one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file_path: String,

    /// Target line number; 0 means the agent could not pin the issue to a line
    pub line_number: u32,

    pub severity: Severity,

    /// Name of the agent that produced this finding
    pub agent: String,

    /// Human-readable description of the issue
    pub comment: String,

    /// Optional remediation text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    /// Findings from different agents that agree on this key are duplicates.
    pub fn dedup_key(&self) -> (String, u32, String) {
        (self.file_path.clone(), self.line_number, self.comment.clone())
    }
}
