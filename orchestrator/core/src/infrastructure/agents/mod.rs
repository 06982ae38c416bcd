// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

pub mod llm;
pub mod prompts;

pub use llm::{AgentBuildError, LlmReviewAgent};
