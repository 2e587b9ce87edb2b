//! Data model for the evaluation engine: agents, prompts, datasets, test
//! cases, judge configs, runs, annotations, proposals, and cost records.
//!
//! Mirrors the Pydantic models in the original `src/api/models.py`; field
//! names keep the `tc_*` / `agent_*` / `eval_*` / `dataset_*` / `prompt_*`
//! / `proposal_*` / `cost_*` wire-level identifier prefixes called out in
//! the spec (see individual `id` fields below).

mod agent;
mod annotation;
mod cost;
mod dataset;
mod judge_config;
mod proposal;
mod run;
mod testcase;

pub use agent::{Agent, PromptVersion};
pub use annotation::{ActionAnnotation, Efficiency, RunAnnotation};
pub use cost::{CallType, CostRecord};
pub use dataset::Dataset;
pub use judge_config::{JudgeConfig, RubricCriterion, RubricLevel, ScoringMode};
pub use proposal::{PromptDiff, Priority, ProposalCategory, ProposalStatus, PromptProposal};
pub use run::{
    EvaluationRun, ExpectedToolResult, FailureMode, Regression, RunStatus, StatusHistoryEntry,
    TestCaseResult,
};
pub use testcase::{
    ArgumentAssertion, AssertionMode, AssertionResult, BehaviorAssertion, BehaviorAssertionResult,
    ResponseQualityAssertion, ResponseQualityResult, TestCase, ToolExpectation,
    ToolExpectationResult,
};

/// Generates a prefixed id the way the original seed/model code does
/// (`f"tc_{uuid.uuid4().hex[:16]}"`): a short, non-cryptographic identifier
/// that is still practically unique within one store.
pub fn new_id(prefix: &str) -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &raw[..16])
}
