//! Driver for the e2e test scenarios under `tests/e2e/`, mirroring the
//! teacher's `serve` crate's `tests/e2e/` layout (one file per scenario,
//! a shared `common` module for server spawn/request helpers).

#[path = "e2e/common.rs"]
mod common;
#[path = "e2e/dataset_lifecycle.rs"]
mod dataset_lifecycle;
#[path = "e2e/agent_and_prompts.rs"]
mod agent_and_prompts;
#[path = "e2e/admin.rs"]
mod admin;
