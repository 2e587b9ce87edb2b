//! Evaluation runs and their embedded per-test-case results
//! (spec §3 "EvaluationRun", "TestCaseResult").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::testcase::{AssertionMode, BehaviorAssertionResult, ResponseQualityResult};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Terminal states never reopen (spec §4.5 state machine).
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled)
    }
}

/// One entry in a run's chronological, append-only activity log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub is_rate_limit: bool,
    pub rate_limit_attempt: Option<u32>,
    pub rate_limit_wait_seconds: Option<f64>,
}

impl StatusHistoryEntry {
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            is_rate_limit: false,
            rate_limit_attempt: None,
            rate_limit_wait_seconds: None,
        }
    }

    pub fn rate_limit(attempt: u32, wait_seconds: f64, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            is_rate_limit: true,
            rate_limit_attempt: Some(attempt),
            rate_limit_wait_seconds: Some(wait_seconds),
        }
    }
}

/// Whether a declared tool in `minimal_tool_set` was actually called.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExpectedToolResult {
    pub tool_name: String,
    pub was_called: bool,
}

/// Heuristic label on a failed case (spec §4.4 step 8). Not authoritative.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    ToolNotCalled,
    WrongTool,
    WrongArgs,
    Hallucination,
    PartialMatch,
}

/// One test-case's outcome, embedded in the owning [`EvaluationRun`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TestCaseResult {
    pub testcase_id: String,
    pub passed: bool,
    pub response_from_agent: String,
    pub tool_calls: serde_json::Value,
    pub expected_tools: Vec<ExpectedToolResult>,
    pub tool_expectation_results: Vec<super::testcase::ToolExpectationResult>,
    pub response_quality_result: Option<ResponseQualityResult>,
    pub behavior_assertions: Vec<BehaviorAssertionResult>,
    pub assertion_mode: Option<AssertionMode>,
    pub execution_error: Option<String>,
    pub retry_count: u32,
    pub failure_mode: Option<FailureMode>,
    pub agent_call_duration_seconds: f64,
    pub judge_call_duration_seconds: f64,
    pub total_duration_seconds: f64,
    pub completed_at: DateTime<Utc>,
}

impl TestCaseResult {
    /// An empty, fully-shaped result for a test case whose agent dispatch
    /// failed outright (spec §4.4 step 2: "still return a fully-shaped
    /// result (empty grading sections)").
    pub fn dispatch_failed(testcase_id: impl Into<String>, error: impl Into<String>, retry_count: u32) -> Self {
        Self {
            testcase_id: testcase_id.into(),
            passed: false,
            response_from_agent: String::new(),
            tool_calls: serde_json::Value::Array(vec![]),
            expected_tools: Vec::new(),
            tool_expectation_results: Vec::new(),
            response_quality_result: None,
            behavior_assertions: Vec::new(),
            assertion_mode: None,
            execution_error: Some(error.into()),
            retry_count,
            failure_mode: None,
            agent_call_duration_seconds: 0.0,
            judge_call_duration_seconds: 0.0,
            total_duration_seconds: 0.0,
            completed_at: Utc::now(),
        }
    }
}

/// A test case that passed in the agent's prior completed run on the same
/// dataset but failed in this one (spec glossary "Regression").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Regression {
    pub testcase_id: String,
    pub previous_result: String,
    pub current_result: String,
}

/// One execution of a dataset against an agent (spec §3 "EvaluationRun").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EvaluationRun {
    pub eval_id: String,
    pub dataset_id: String,
    pub agent_id: String,
    pub prompt_version: u32,
    pub judge_config_id: String,
    pub judge_config_version: u32,
    pub agent_endpoint_url: String,
    pub timeout_seconds: u64,
    pub status: RunStatus,
    pub status_message: String,
    pub status_history: Vec<StatusHistoryEntry>,
    pub total_tests: usize,
    pub completed_tests: usize,
    pub passed_count: usize,
    pub failed_tests: usize,
    pub in_progress_tests: usize,
    pub test_cases: Vec<TestCaseResult>,
    pub rate_limit_hits: u32,
    pub retry_wait_seconds: f64,
    pub regressions: Vec<Regression>,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl EvaluationRun {
    pub fn new(
        dataset_id: impl Into<String>,
        agent_id: impl Into<String>,
        prompt_version: u32,
        judge_config_id: impl Into<String>,
        judge_config_version: u32,
        agent_endpoint_url: impl Into<String>,
        timeout_seconds: u64,
        total_tests: usize,
    ) -> Self {
        Self {
            eval_id: crate::model::new_id("eval"),
            dataset_id: dataset_id.into(),
            agent_id: agent_id.into(),
            prompt_version,
            judge_config_id: judge_config_id.into(),
            judge_config_version,
            agent_endpoint_url: agent_endpoint_url.into(),
            timeout_seconds,
            status: RunStatus::Pending,
            status_message: "queued".to_string(),
            status_history: vec![StatusHistoryEntry::plain("run created")],
            total_tests,
            completed_tests: 0,
            passed_count: 0,
            failed_tests: 0,
            in_progress_tests: 0,
            test_cases: Vec::new(),
            rate_limit_hits: 0,
            retry_wait_seconds: 0.0,
            regressions: Vec::new(),
            warnings: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}
