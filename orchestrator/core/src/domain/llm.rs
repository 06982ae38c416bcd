// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Domain Interface (Anti-Corruption Layer)
//
// Isolates the review agents from vendor APIs. Implementations live in
// infrastructure/llm/.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Domain interface for analysis backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a system + user prompt pair.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 = deterministic)
    pub temperature: Option<f32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: Some(1024),
            temperature: Some(0.2),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl LlmError {
    /// Transient failures worth another attempt after backoff. Auth and
    /// missing-model errors fail fast: retrying cannot fix them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Network(_) | LlmError::RateLimit | LlmError::Provider(_))
    }
}
