// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! Command implementations for the `magpie` binary.

pub mod commands;
pub mod github;
pub mod output;
