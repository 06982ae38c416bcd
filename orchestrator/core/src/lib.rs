// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! # Magpie Review Core
//!
//! Parallel multi-agent review engine: a fixed set of independent analysis
//! agents runs concurrently against a shared parsed code diff, individual
//! failures and timeouts are contained per agent, and all outputs fold into
//! one deduplicated, severity-ranked, file-grouped report.
//!
//! # Architecture
//!
//! - **domain** — change records, findings, the agent contract, results,
//!   configuration, and the LLM provider interface
//! - **application** — agent registry, parallel dispatcher, aggregator, and
//!   the batch orchestrator facade
//! - **infrastructure** — diff parsing, the OpenAI-compatible LLM adapter,
//!   and the built-in review agents

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
