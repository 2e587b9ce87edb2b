//! One module per resource family (spec §6 "API surface"). Handlers are
//! thin translations to/from `agenteval`'s core types — no independent
//! business logic lives here.

pub mod admin;
pub mod agents;
pub mod annotations;
pub mod datasets;
pub mod evaluations;
pub mod judge_configs;
pub mod proposals;
pub mod testcases;
