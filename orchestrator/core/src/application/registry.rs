// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Registry
//!
//! Static mapping from a closed set of agent identities to constructors
//! behind the uniform [`ReviewAgent`] contract. Resolution is best-effort:
//! unknown names and construction failures (e.g. a missing API key) are
//! logged and skipped, never fatal to the batch. An empty resolution means
//! "nothing to do", not an error.

use crate::domain::agent::ReviewAgent;
use crate::domain::config::ReviewConfig;
use crate::infrastructure::agents::{AgentBuildError, LlmReviewAgent};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Closed set of built-in agent identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    CodeQuality,
    Logic,
    Security,
    Performance,
    Readability,
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::CodeQuality,
        AgentKind::Logic,
        AgentKind::Security,
        AgentKind::Performance,
        AgentKind::Readability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::CodeQuality => "code_quality",
            AgentKind::Logic => "logic",
            AgentKind::Security => "security",
            AgentKind::Performance => "performance",
            AgentKind::Readability => "readability",
        }
    }

    /// Canonical agent name, e.g. `security_agent`.
    pub fn agent_name(&self) -> &'static str {
        match self {
            AgentKind::CodeQuality => "code_quality_agent",
            AgentKind::Logic => "logic_agent",
            AgentKind::Security => "security_agent",
            AgentKind::Performance => "performance_agent",
            AgentKind::Readability => "readability_agent",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.agent_name())
    }
}

impl FromStr for AgentKind {
    type Err = RegistryError;

    /// Accepts both the short kind (`security`) and the canonical agent name
    /// (`security_agent`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentKind::ALL
            .into_iter()
            .find(|kind| s == kind.as_str() || s == kind.agent_name())
            .ok_or_else(|| RegistryError::UnknownAgent(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("failed to construct {name}: {source}")]
    Construction {
        name: &'static str,
        #[source]
        source: AgentBuildError,
    },
}

/// Resolves the active agent set for one batch.
pub struct AgentRegistry {
    config: ReviewConfig,
}

impl AgentRegistry {
    pub fn new(config: ReviewConfig) -> Self {
        Self { config }
    }

    /// Instantiate one agent by kind.
    pub fn build(&self, kind: AgentKind) -> Result<Arc<dyn ReviewAgent>, RegistryError> {
        let agent = LlmReviewAgent::new(kind, &self.config.llm).map_err(|source| {
            RegistryError::Construction { name: kind.agent_name(), source }
        })?;
        Ok(Arc::new(agent))
    }

    /// Resolve the active agent set.
    ///
    /// A non-empty `requested` list wins, in the order given; otherwise the
    /// config's enabled set applies. Unknown names and construction failures
    /// are skipped with a warning.
    pub fn resolve(&self, requested: Option<&[String]>) -> Vec<Arc<dyn ReviewAgent>> {
        let kinds: Vec<AgentKind> = match requested {
            Some(names) if !names.is_empty() => names
                .iter()
                .filter_map(|name| match name.parse::<AgentKind>() {
                    Ok(kind) => Some(kind),
                    Err(err) => {
                        warn!(agent = %name, "{err}, skipping");
                        None
                    }
                })
                .collect(),
            _ => self.enabled_kinds(),
        };

        let mut agents: Vec<Arc<dyn ReviewAgent>> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            match self.build(kind) {
                Ok(agent) => {
                    info!(agent = %kind, "enabled agent");
                    agents.push(agent);
                }
                Err(err) => warn!(agent = %kind, "{err}, skipping"),
            }
        }
        agents
    }

    fn enabled_kinds(&self) -> Vec<AgentKind> {
        let enabled = &self.config.enabled;
        AgentKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                AgentKind::CodeQuality => enabled.code_quality,
                AgentKind::Logic => enabled.logic,
                AgentKind::Security => enabled.security,
                AgentKind::Performance => enabled.performance,
                AgentKind::Readability => enabled.readability,
            })
            .collect()
    }
}
