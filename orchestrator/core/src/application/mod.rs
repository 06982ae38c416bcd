// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0

pub mod registry;
pub mod dispatcher;
pub mod aggregator;
pub mod orchestrator;

pub use aggregator::aggregate;
pub use dispatcher::{dispatch, run_agent, DispatchLimits};
pub use orchestrator::ReviewOrchestrator;
pub use registry::{AgentKind, AgentRegistry, RegistryError};
