// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

// Review Configuration
//
// One explicit struct passed into the registry and dispatcher at construction
// time. No module-level settings object: every test builds its own config.

use crate::domain::finding::Severity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Configuration for one review batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Worker pool size; `None` means one worker per agent (full parallelism)
    pub max_workers: Option<usize>,

    /// Per-agent timeout, independent of the other agents
    #[serde(with = "humantime_serde")]
    pub agent_timeout: Duration,

    /// Findings strictly less urgent than this floor are dropped
    pub min_severity: Severity,

    /// Cap on merged entries per file/severity bucket
    pub max_comments_per_file: usize,

    /// Default enabled-agent set, used when no explicit selection is given
    pub enabled: EnabledAgents,

    pub llm: LlmSettings,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            agent_timeout: Duration::from_secs(60),
            min_severity: Severity::Info,
            max_comments_per_file: 20,
            enabled: EnabledAgents::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl ReviewConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }
}

/// One boolean per built-in agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledAgents {
    pub code_quality: bool,
    pub logic: bool,
    pub security: bool,
    pub performance: bool,
    pub readability: bool,
}

impl Default for EnabledAgents {
    fn default() -> Self {
        Self {
            code_quality: true,
            logic: true,
            security: true,
            performance: true,
            readability: true,
        }
    }
}

/// Settings for the OpenAI-compatible analysis backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Endpoint base, e.g. `https://api.openai.com/v1` or a local vLLM server
    pub base_url: String,

    /// API key; falls back to `OPENAI_API_KEY` when absent
    pub api_key: Option<String>,

    pub model: String,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Lines per request; agents sub-batch large files to stay under token limits
    pub batch_size: usize,

    /// Retry attempts for transient backend failures
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            temperature: 0.2,
            batch_size: 50,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl LlmSettings {
    /// Explicit key wins; the environment is only a fallback.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }
}
