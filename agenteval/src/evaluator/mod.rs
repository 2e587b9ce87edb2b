//! Runs one test case end-to-end: dispatch to the agent, grade the
//! response, and produce a fully-shaped [`crate::model::TestCaseResult`]
//! (spec §4.4 "TestCaseEvaluator").
//!
//! Dispatch and judge failures never propagate as `Err` — they degrade to
//! a `TestCaseResult` with `execution_error` set, the same fail-closed
//! contract [`crate::judge::grading`] uses for parse failures. Only a
//! store write failure propagates past this layer (spec §4.5).

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dispatcher::AgentClient;
use crate::judge::{grade, JudgeClient};
use crate::model::{CallType, CostRecord, ExpectedToolResult, FailureMode, JudgeConfig, TestCase, TestCaseResult};
use crate::retry::{RetryEvent, RetrySink};

/// Outcome of evaluating one test case, surfaced to
/// [`crate::coordinator::RunCoordinator`] so it can append rate-limit
/// status-history entries and cost records at the run level without this
/// module knowing about `EvaluationRun`.
pub struct EvaluationOutcome {
    pub result: TestCaseResult,
    pub retry_events: Vec<RetryEvent>,
    pub cost_records: Vec<CostRecord>,
}

pub struct TestCaseEvaluator<'a> {
    pub agent_client: &'a dyn AgentClient,
    pub judge_client: &'a dyn JudgeClient,
    pub verbose_logging: bool,
}

impl<'a> TestCaseEvaluator<'a> {
    pub fn new(agent_client: &'a dyn AgentClient, judge_client: &'a dyn JudgeClient) -> Self {
        Self {
            agent_client,
            judge_client,
            verbose_logging: false,
        }
    }

    pub async fn evaluate(
        &self,
        testcase: &TestCase,
        agent_endpoint_url: &str,
        judge_config: &JudgeConfig,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> EvaluationOutcome {
        let total_started = Instant::now();
        debug!(tc_id = %testcase.tc_id, "evaluating test case");

        let retry_sink = RetrySink::new();

        let dispatch = self
            .agent_client
            .dispatch(agent_endpoint_url, &testcase.input, timeout, cancel, &retry_sink)
            .await;

        let agent_response = match dispatch {
            Ok(r) => r,
            Err(err) => {
                warn!(tc_id = %testcase.tc_id, error = %err, "agent dispatch failed");
                let retry_events = retry_sink.drain();
                let retry_count = retry_events.len() as u32;
                return EvaluationOutcome {
                    result: TestCaseResult::dispatch_failed(&testcase.tc_id, err.to_string(), retry_count),
                    retry_events,
                    cost_records: Vec::new(),
                };
            }
        };

        let mut cost_records = Vec::new();
        if agent_response.model.is_some() || agent_response.tokens_in > 0 || agent_response.tokens_out > 0 {
            let mut cost = CostRecord::new(CallType::AgentInvocation, agent_response.model.clone().unwrap_or_default());
            cost.testcase_id = Some(testcase.tc_id.clone());
            cost.tokens_in = agent_response.tokens_in;
            cost.tokens_out = agent_response.tokens_out;
            cost.cost_usd = agent_response.cost_usd;
            cost_records.push(cost);
        }

        let expected_tools: Vec<ExpectedToolResult> = testcase
            .minimal_tool_set
            .iter()
            .map(|name| ExpectedToolResult {
                tool_name: name.clone(),
                was_called: tool_was_called(&agent_response.tool_calls, name),
            })
            .collect();

        let grade_result = grade(
            self.judge_client,
            judge_config,
            testcase,
            &agent_response.response,
            &agent_response.tool_calls,
            &retry_sink,
        )
        .await;

        let (passed, tool_expectation_results, behavior_assertions, response_quality_result, judge_duration, execution_error) =
            match grade_result {
                Ok(outcome) => {
                    cost_records.extend(outcome.cost_records);
                    (
                        outcome.passed && expected_tools.iter().all(|t| t.was_called),
                        outcome.tool_expectation_results,
                        outcome.behavior_assertions,
                        outcome.response_quality_result,
                        outcome.judge_call_duration_seconds,
                        None,
                    )
                }
                Err(err) => {
                    warn!(tc_id = %testcase.tc_id, error = %err, "judge call failed");
                    (false, Vec::new(), Vec::new(), None, 0.0, Some(err.to_string()))
                }
            };

        let retry_events = retry_sink.drain();
        let retry_count = retry_events.len() as u32;

        if self.verbose_logging {
            for expectation in &expected_tools {
                debug!(tc_id = %testcase.tc_id, tool = %expectation.tool_name, was_called = expectation.was_called, "tool expectation");
            }
        }

        let failure_mode = if passed {
            None
        } else {
            Some(classify_failure(testcase, &expected_tools, &agent_response.response))
        };

        let agent_call_duration_seconds = agent_response.call_duration.as_secs_f64();
        let result = TestCaseResult {
            testcase_id: testcase.tc_id.clone(),
            passed,
            response_from_agent: agent_response.response,
            tool_calls: agent_response.tool_calls,
            expected_tools,
            tool_expectation_results,
            response_quality_result,
            behavior_assertions,
            assertion_mode: Some(testcase.assertion_mode),
            execution_error,
            retry_count,
            failure_mode,
            agent_call_duration_seconds,
            judge_call_duration_seconds: judge_duration,
            total_duration_seconds: total_started.elapsed().as_secs_f64(),
            completed_at: chrono::Utc::now(),
        };

        EvaluationOutcome {
            result,
            retry_events,
            cost_records,
        }
    }
}

fn tool_was_called(tool_calls: &serde_json::Value, tool_name: &str) -> bool {
    tool_calls
        .as_array()
        .map(|calls| calls.iter().any(|c| c.get("name").and_then(|n| n.as_str()) == Some(tool_name)))
        .unwrap_or(false)
}

/// Heuristic failure classification (spec §4.4 step 8): not authoritative,
/// just a hint surfaced in the UI for a failed case.
fn classify_failure(testcase: &TestCase, expected_tools: &[ExpectedToolResult], response: &str) -> FailureMode {
    if expected_tools.iter().any(|t| !t.was_called) {
        return FailureMode::ToolNotCalled;
    }
    if !testcase.tool_expectations.is_empty() {
        return FailureMode::WrongArgs;
    }
    if response.trim().is_empty() {
        return FailureMode::Hallucination;
    }
    FailureMode::PartialMatch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::MockAgent;
    use crate::judge::MockJudge;
    use crate::model::{JudgeConfig, TestCase};

    #[tokio::test]
    async fn dispatch_failure_yields_fully_shaped_result_not_panic() {
        let agent = MockAgent::rate_limited();
        let judge = MockJudge::with_response("{}");
        let evaluator = TestCaseEvaluator::new(&agent, &judge);
        let tc = TestCase::new("ds_1", "hi", "ok", vec![], vec![], None);
        let cfg = JudgeConfig::binary("j", 1, "grade strictly");
        let cancel = CancellationToken::new();

        let outcome = evaluator.evaluate(&tc, "http://agent", &cfg, Duration::from_secs(5), &cancel).await;
        assert!(!outcome.result.passed);
        assert!(outcome.result.execution_error.is_some());
    }

    #[tokio::test]
    async fn rate_limited_retries_are_recorded_and_counted_on_retry_count() {
        let agent = MockAgent::rate_limited_then_success(2, "done", serde_json::json!([]));
        let judge = MockJudge::with_response(r#"{"passed":true,"explanation":"ok"}"#);
        let evaluator = TestCaseEvaluator::new(&agent, &judge);
        let tc = TestCase::new("ds_1", "hi", "done", vec![], vec![], None);
        let cfg = JudgeConfig::binary("j", 1, "grade strictly");
        let cancel = CancellationToken::new();

        let outcome = evaluator.evaluate(&tc, "http://agent", &cfg, Duration::from_secs(5), &cancel).await;
        assert!(outcome.result.passed);
        assert_eq!(outcome.result.retry_count, 2);
        assert_eq!(outcome.retry_events.len(), 2);
        assert!(outcome.retry_events.iter().all(|e| e.source == crate::retry::RetrySource::Agent));
    }

    #[tokio::test]
    async fn successful_response_only_case_passes_through_judge() {
        let agent = MockAgent::with_response("4", serde_json::json!([]));
        let judge = MockJudge::with_response(r#"{"passed":true,"explanation":"correct"}"#);
        let evaluator = TestCaseEvaluator::new(&agent, &judge);
        let tc = TestCase::new("ds_1", "2+2?", "4", vec![], vec![], None);
        let cfg = JudgeConfig::binary("j", 1, "grade strictly");
        let cancel = CancellationToken::new();

        let outcome = evaluator.evaluate(&tc, "http://agent", &cfg, Duration::from_secs(5), &cancel).await;
        assert!(outcome.result.passed);
        assert!(outcome.result.execution_error.is_none());
    }
}
