// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

pub mod diff;
pub mod llm;
pub mod agents;

pub use diff::parse_diff;
