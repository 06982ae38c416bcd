// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

// OpenAI-compatible LLM Provider Adapter
//
// Anti-Corruption Layer for the chat-completions API. Works with any
// OpenAI-compatible backend (Azure, LM Studio, vLLM, etc.). Transient
// failures are retried with exponential backoff up to `max_retries`;
// authentication and missing-model errors fail fast.

use crate::domain::config::LlmSettings;
use crate::domain::llm::{GenerationOptions, LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

pub struct OpenAiAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
    retry_delay: Duration,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiAdapter {
    pub fn new(settings: &LlmSettings, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.clone(),
            api_key,
            model: settings.model.clone(),
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay,
        }
    }

    async fn request_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system_prompt.to_string() },
                ChatMessage { role: "user".to_string(), content: user_prompt.to_string() },
            ],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            // Enforce strict JSON output
            response_format: ResponseFormat { kind: "json_object" },
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(if status == 401 || status == 403 {
                LlmError::Authentication(error_text)
            } else if status == 429 {
                LlmError::RateLimit
            } else if status == 404 {
                LlmError::ModelNotFound(self.model.clone())
            } else {
                LlmError::Provider(format!("HTTP {status}: {error_text}"))
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("failed to parse response: {e}")))?;

        let choice = chat_response
            .choices
            .first()
            .ok_or_else(|| LlmError::Provider("no choices in response".into()))?;

        if choice.message.content.is_empty() {
            return Err(LlmError::Provider("empty completion".into()));
        }
        Ok(choice.message.content.clone())
    }
}

#[async_trait]
impl LlmProvider for OpenAiAdapter {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            match self.request_completion(system_prompt, user_prompt, options).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let backoff = self.retry_delay * 2u32.saturating_pow(attempt);
                    warn!(
                        model = %self.model,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying after transient backend error: {err}"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
