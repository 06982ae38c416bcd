// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! LLM-backed review agent.
//!
//! One implementation serves every [`AgentKind`]: the kind selects the prompt
//! focus, everything else — per-file grouping, skip list, sub-batching, and
//! tolerant parsing of the model's JSON — is shared. The agent talks to its
//! backend through the [`LlmProvider`] trait only.

use crate::application::registry::AgentKind;
use crate::domain::agent::{AgentError, ReviewAgent};
use crate::domain::change::{self, ChangeRecord};
use crate::domain::config::LlmSettings;
use crate::domain::finding::{Finding, Severity};
use crate::domain::llm::{GenerationOptions, LlmProvider};
use crate::infrastructure::agents::prompts;
use crate::infrastructure::llm::OpenAiAdapter;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AgentBuildError {
    #[error("{agent} requires an API key (set llm.api_key or OPENAI_API_KEY)")]
    MissingApiKey { agent: &'static str },
}

pub struct LlmReviewAgent {
    kind: AgentKind,
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    batch_size: usize,
}

impl std::fmt::Debug for LlmReviewAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmReviewAgent")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl LlmReviewAgent {
    /// Construct an agent against the configured OpenAI-compatible backend.
    /// Fails when no API key can be resolved; the registry treats that as
    /// "skip this agent", not as a batch error.
    pub fn new(kind: AgentKind, settings: &LlmSettings) -> Result<Self, AgentBuildError> {
        let api_key = settings
            .resolve_api_key()
            .ok_or(AgentBuildError::MissingApiKey { agent: kind.agent_name() })?;

        let provider = Arc::new(OpenAiAdapter::new(settings, api_key));
        Ok(Self::with_provider(kind, provider, settings))
    }

    /// Construct against an arbitrary provider (tests, alternative backends).
    pub fn with_provider(kind: AgentKind, provider: Arc<dyn LlmProvider>, settings: &LlmSettings) -> Self {
        Self {
            kind,
            provider,
            options: GenerationOptions {
                max_tokens: Some(settings.max_tokens),
                temperature: Some(settings.temperature),
            },
            batch_size: settings.batch_size.max(1),
        }
    }

    async fn analyze_batch(
        &self,
        batch: &[&ChangeRecord],
        file_path: &str,
    ) -> Result<Vec<Finding>, AgentError> {
        let language = change::detect_language(file_path);
        let block = prompts::code_block(batch);
        let prompt = prompts::analysis_prompt(self.kind, file_path, language, &block);

        let response = self
            .provider
            .generate(prompts::SYSTEM_PROMPT, &prompt, &self.options)
            .await
            .map_err(|e| AgentError::Backend(e.to_string()))?;

        self.parse_response(&response, file_path)
    }

    /// Parse the model's JSON issue list into findings.
    ///
    /// Tolerant by design: markdown fences are stripped, an invalid severity
    /// degrades to `info`, a missing line becomes 0, and entries without
    /// issue text are skipped. Only structurally broken JSON is an error.
    fn parse_response(&self, response: &str, file_path: &str) -> Result<Vec<Finding>, AgentError> {
        let cleaned = strip_fences(response);
        let value: serde_json::Value = serde_json::from_str(cleaned)
            .map_err(|e| AgentError::InvalidResponse(format!("invalid JSON from model: {e}")))?;

        let issues = match value.get("issues") {
            Some(serde_json::Value::Array(issues)) => issues,
            _ => {
                return Err(AgentError::InvalidResponse(
                    "response has no 'issues' array".to_string(),
                ))
            }
        };

        let mut findings = Vec::new();
        for issue in issues {
            let comment = issue.get("issue").and_then(|v| v.as_str()).unwrap_or("").trim();
            if comment.is_empty() {
                continue;
            }

            let severity = issue
                .get("severity")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<Severity>().ok())
                .unwrap_or(Severity::Info);

            let line_number = issue
                .get("line")
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);

            let suggestion = issue
                .get("suggestion")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            findings.push(Finding {
                file_path: file_path.to_string(),
                line_number,
                severity,
                agent: self.kind.agent_name().to_string(),
                comment: comment.to_string(),
                suggestion,
            });
        }
        Ok(findings)
    }
}

#[async_trait]
impl ReviewAgent for LlmReviewAgent {
    fn name(&self) -> &str {
        self.kind.agent_name()
    }

    /// A failed batch is tolerated (logged, remaining batches continue);
    /// when every batch fails the agent as a whole fails.
    async fn review(&self, changes: &[ChangeRecord]) -> Result<Vec<Finding>, AgentError> {
        if changes.is_empty() {
            return Ok(Vec::new());
        }

        let grouped = change::group_by_file(changes);
        let mut findings = Vec::new();
        let mut batches = 0usize;
        let mut failed_batches = 0usize;
        let mut last_error = None;

        for (file_path, file_changes) in grouped {
            if change::should_skip_file(file_path) {
                debug!(agent = %self.kind, file = %file_path, "skipping generated file");
                continue;
            }

            for batch in file_changes.chunks(self.batch_size) {
                batches += 1;
                match self.analyze_batch(batch, file_path).await {
                    Ok(batch_findings) => findings.extend(batch_findings),
                    Err(err) => {
                        warn!(agent = %self.kind, file = %file_path, "batch analysis failed: {err}");
                        failed_batches += 1;
                        last_error = Some(err);
                    }
                }
            }
        }

        if batches > 0 && failed_batches == batches {
            let err = last_error.expect("failed batches imply an error");
            return Err(AgentError::Backend(format!("all {batches} analysis batches failed: {err}")));
        }
        Ok(findings)
    }
}

fn strip_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::LlmError;
    use std::sync::Mutex;

    /// Scripted provider: returns canned responses in order.
    struct ScriptedProvider {
        responses: Mutex<Vec<Result<String, LlmError>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self { responses: Mutex::new(responses) })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, LlmError> {
            let mut responses = self.responses.lock().unwrap();
            responses.remove(0)
        }
    }

    fn agent_with(responses: Vec<Result<String, LlmError>>) -> LlmReviewAgent {
        LlmReviewAgent::with_provider(
            AgentKind::Security,
            ScriptedProvider::new(responses),
            &LlmSettings::default(),
        )
    }

    fn test_agent() -> LlmReviewAgent {
        agent_with(vec![])
    }

    #[test]
    fn test_parse_valid_response() {
        let findings = test_agent()
            .parse_response(
                r#"{"issues": [{"line": 12, "severity": "critical", "issue": "hardcoded secret", "suggestion": "use a secret manager"}]}"#,
                "auth.py",
            )
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].file_path, "auth.py");
        assert_eq!(findings[0].line_number, 12);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].agent, "security_agent");
        assert_eq!(findings[0].suggestion.as_deref(), Some("use a secret manager"));
    }

    #[test]
    fn test_parse_strips_markdown_fences() {
        let findings = test_agent()
            .parse_response(
                "```json\n{\"issues\": [{\"line\": 3, \"severity\": \"minor\", \"issue\": \"long line\"}]}\n```",
                "a.py",
            )
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert!(findings[0].suggestion.is_none());
    }

    #[test]
    fn test_parse_degrades_gracefully() {
        let findings = test_agent()
            .parse_response(
                r#"{"issues": [
                    {"severity": "blocker", "issue": "weird severity"},
                    {"line": 4, "issue": ""},
                    {"line": 5, "suggestion": "no issue text"}
                ]}"#,
                "a.py",
            )
            .unwrap();

        // Entries without issue text are dropped; the bad severity survives as info
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(findings[0].line_number, 0);
    }

    #[test]
    fn test_parse_clamps_absurd_line_numbers_to_unknown() {
        let findings = test_agent()
            .parse_response(
                r#"{"issues": [{"line": 99999999999, "severity": "major", "issue": "huge line"}]}"#,
                "a.py",
            )
            .unwrap();

        // A line number the diff could never contain degrades to 0, not a wrapped value
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_number, 0);
    }

    #[test]
    fn test_parse_rejects_broken_json() {
        assert!(test_agent().parse_response("not json at all", "a.py").is_err());
        assert!(test_agent().parse_response(r#"{"issues": "oops"}"#, "a.py").is_err());
    }

    #[tokio::test]
    async fn test_review_skips_generated_files() {
        let agent = agent_with(vec![Ok(
            r#"{"issues": [{"line": 1, "severity": "major", "issue": "found"}]}"#.to_string(),
        )]);

        let changes = vec![
            ChangeRecord::new("package-lock.json", 1, "\"lodash\": \"4.17.21\""),
            ChangeRecord::new("app.py", 1, "secret = 'hunter2'"),
        ];
        let findings = agent.review(&changes).await.unwrap();

        // Only app.py reached the backend
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].file_path, "app.py");
    }

    #[tokio::test]
    async fn test_review_tolerates_partial_batch_failure() {
        let agent = agent_with(vec![
            Err(LlmError::RateLimit),
            Ok(r#"{"issues": [{"line": 2, "severity": "minor", "issue": "ok"}]}"#.to_string()),
        ]);

        let changes = vec![
            ChangeRecord::new("a.py", 1, "x = 1"),
            ChangeRecord::new("b.py", 2, "y = 2"),
        ];
        let findings = agent.review(&changes).await.unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].file_path, "b.py");
    }

    #[tokio::test]
    async fn test_review_fails_when_every_batch_fails() {
        let agent = agent_with(vec![
            Err(LlmError::Network("down".into())),
            Err(LlmError::Network("still down".into())),
        ]);

        let changes = vec![
            ChangeRecord::new("a.py", 1, "x = 1"),
            ChangeRecord::new("b.py", 2, "y = 2"),
        ];

        let err = agent.review(&changes).await.unwrap_err();
        assert!(err.to_string().contains("all 2 analysis batches failed"));
    }

    #[tokio::test]
    async fn test_review_batches_large_files() {
        let mut settings = LlmSettings::default();
        settings.batch_size = 2;
        let provider = ScriptedProvider::new(vec![
            Ok(r#"{"issues": []}"#.to_string()),
            Ok(r#"{"issues": []}"#.to_string()),
        ]);
        let agent = LlmReviewAgent::with_provider(AgentKind::Logic, Arc::clone(&provider) as Arc<dyn LlmProvider>, &settings);

        let changes: Vec<ChangeRecord> =
            (1..=4).map(|i| ChangeRecord::new("big.py", i, format!("line {i}"))).collect();
        let findings = agent.review(&changes).await.unwrap();

        assert!(findings.is_empty());
        // Both scripted responses were consumed: two batches of two lines
        assert!(provider.responses.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_api_key_fails_construction() {
        let mut settings = LlmSettings::default();
        settings.api_key = Some(String::new());

        let err = LlmReviewAgent::new(AgentKind::Security, &settings).unwrap_err();
        assert!(err.to_string().contains("security_agent requires an API key"));
    }
}
