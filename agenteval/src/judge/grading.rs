//! Grading algorithm: renders a [`crate::model::JudgeConfig`]'s templates
//! for one test case's outcome, calls the judge, and distributes the
//! verdicts back onto the assertion shapes in [`crate::model::testcase`]
//! (spec §4.3).
//!
//! Every mode also issues a response-quality judge call (spec §4.4's mode
//! table: `response_quality = yes` for all three modes), so `passed`
//! always folds in that verdict alongside whatever tool/behavior checks
//! the mode requires.
//!
//! Grading never fails on a malformed judge response — a parse failure
//! degrades every pending check to `passed: false` with the raw text
//! recorded as `llm_judge_output`, per spec §7's fail-closed policy.
//! Only judge transport/rate-limit errors propagate as `Err`, and only
//! after [`crate::retry`] has already exhausted its attempts.

use std::time::Instant;

use serde::Deserialize;

use crate::error::JudgeError;
use crate::model::{
    ArgumentAssertionResult, AssertionMode, AssertionResult, BehaviorAssertionResult, CallType, CostRecord, JudgeConfig,
    ResponseQualityResult, RubricCriterion, ScoringMode, TestCase, ToolExpectationResult,
};
use crate::retry::RetrySink;

use super::bool_coerce::coerce_bool;
use super::client::{JudgeClient, JudgeCompletion};
use super::templates::{render, render_checklist};

pub struct GradeOutcome {
    pub tool_expectation_results: Vec<ToolExpectationResult>,
    pub behavior_assertions: Vec<BehaviorAssertionResult>,
    pub response_quality_result: Option<ResponseQualityResult>,
    pub passed: bool,
    pub judge_call_duration_seconds: f64,
    pub cost_records: Vec<CostRecord>,
}

#[derive(Deserialize)]
struct Verdict {
    #[serde(default)]
    passed: serde_json::Value,
    #[serde(default)]
    explanation: String,
}

fn parse_verdicts(raw: &str, expected: usize) -> Vec<Verdict> {
    let parsed: Option<Vec<Verdict>> = serde_json::from_str(raw).ok();
    let mut verdicts = parsed.unwrap_or_default();
    while verdicts.len() < expected {
        verdicts.push(Verdict {
            passed: serde_json::Value::Bool(false),
            explanation: "judge returned no verdict for this check".to_string(),
        });
    }
    verdicts.truncate(expected);
    verdicts
}

fn parse_single_verdict(raw: &str) -> Verdict {
    serde_json::from_str(raw).unwrap_or(Verdict {
        passed: serde_json::Value::Bool(false),
        explanation: raw.to_string(),
    })
}

/// Whether a tool call with the given name appears in the agent's
/// reported `tool_calls` payload (an array of `{"name": ..., ...}`).
fn tool_was_called(tool_calls: &serde_json::Value, tool_name: &str) -> bool {
    tool_calls
        .as_array()
        .map(|calls| calls.iter().any(|c| c.get("name").and_then(|n| n.as_str()) == Some(tool_name)))
        .unwrap_or(false)
}

/// Distinct tool names, in first-seen order, joined for a `{{tool_name}}`
/// / `{{actual_tools}}` placeholder.
fn distinct_tool_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen.join(", ")
}

fn actual_tools_list(tool_calls: &serde_json::Value) -> String {
    let names = tool_calls
        .as_array()
        .map(|calls| calls.iter().filter_map(|c| c.get("name").and_then(|n| n.as_str())).collect::<Vec<_>>())
        .unwrap_or_default();
    distinct_tool_names(names.into_iter())
}

/// Renders the rubric's criteria and level descriptors into the
/// `{{rubric}}` placeholder. Empty outside rubric scoring mode — spec
/// §4.3 "Rubric semantics" shapes the *prompt*, not a numeric aggregation,
/// so binary configs simply never reference the placeholder.
fn render_rubric(judge_config: &JudgeConfig) -> String {
    if judge_config.scoring_mode != ScoringMode::Rubric || judge_config.rubric.is_empty() {
        return String::new();
    }
    judge_config
        .rubric
        .iter()
        .map(render_criterion)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_criterion(criterion: &RubricCriterion) -> String {
    let levels = criterion
        .levels
        .iter()
        .map(|level| format!("  {}. {}", level.score, level.description))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}: {}\n{levels}", criterion.name, criterion.description)
}

fn judge_cost_record(client: &dyn JudgeClient, completion: &JudgeCompletion, testcase_id: &str) -> CostRecord {
    let mut cost = CostRecord::new(CallType::JudgeLlm, client.model_label());
    cost.testcase_id = Some(testcase_id.to_string());
    cost.tokens_in = completion.tokens_in;
    cost.tokens_out = completion.tokens_out;
    cost
}

pub async fn grade(
    client: &dyn JudgeClient,
    judge_config: &JudgeConfig,
    testcase: &TestCase,
    response: &str,
    tool_calls: &serde_json::Value,
    retry_sink: &RetrySink,
) -> Result<GradeOutcome, JudgeError> {
    let started = Instant::now();

    let outcome = match testcase.assertion_mode {
        AssertionMode::ToolLevel => grade_tool_level(client, judge_config, testcase, response, tool_calls, retry_sink).await?,
        AssertionMode::Hybrid => grade_hybrid(client, judge_config, testcase, response, tool_calls, retry_sink).await?,
        AssertionMode::ResponseOnly => grade_response_only(client, judge_config, testcase, response, tool_calls, retry_sink).await?,
    };

    Ok(GradeOutcome {
        judge_call_duration_seconds: started.elapsed().as_secs_f64(),
        ..outcome
    })
}

async fn grade_tool_level(
    client: &dyn JudgeClient,
    judge_config: &JudgeConfig,
    testcase: &TestCase,
    response: &str,
    tool_calls: &serde_json::Value,
    retry_sink: &RetrySink,
) -> Result<GradeOutcome, JudgeError> {
    // Flatten (tool, arg, assertion_text) triplets into one checklist so a
    // single batched judge call covers every argument assertion.
    struct Slot {
        tool_idx: usize,
        arg_idx: usize,
    }
    let mut checklist = Vec::new();
    let mut slots = Vec::new();
    for (tool_idx, expectation) in testcase.tool_expectations.iter().enumerate() {
        for (arg_idx, arg) in expectation.arguments.iter().enumerate() {
            for assertion in &arg.assertions {
                checklist.push(format!(
                    "tool `{}` argument `{}`: {}",
                    expectation.tool_name, arg.arg_name, assertion
                ));
                slots.push(Slot { tool_idx, arg_idx });
            }
        }
    }

    let mut cost_records = Vec::new();
    let verdicts = if checklist.is_empty() {
        Vec::new()
    } else {
        let tool_name = distinct_tool_names(testcase.tool_expectations.iter().map(|e| e.tool_name.as_str()));
        let user_prompt = render(
            &judge_config.user_prompt_template_batched,
            &[
                ("test_input", &testcase.input),
                ("test_description", &testcase.description),
                ("tool_name", &tool_name),
                ("tool_calls_json", &tool_calls.to_string()),
                ("actual_tools", &actual_tools_list(tool_calls)),
                ("assertions_block", &render_checklist(&checklist)),
                ("rubric", &render_rubric(judge_config)),
            ],
        );
        let completion = client.complete(&judge_config.system_prompt, &user_prompt, retry_sink).await?;
        cost_records.push(judge_cost_record(client, &completion, &testcase.tc_id));
        parse_verdicts(&completion.content, checklist.len())
    };

    let mut results: Vec<ToolExpectationResult> = testcase
        .tool_expectations
        .iter()
        .map(|e| ToolExpectationResult {
            tool_name: e.tool_name.clone(),
            arguments: e
                .arguments
                .iter()
                .map(|a| ArgumentAssertionResult {
                    arg_name: a.arg_name.clone(),
                    assertions: Vec::new(),
                })
                .collect(),
        })
        .collect();

    for (slot, verdict) in slots.into_iter().zip(verdicts.into_iter()) {
        results[slot.tool_idx].arguments[slot.arg_idx].assertions.push(AssertionResult {
            passed: coerce_bool(&verdict.passed),
            llm_judge_output: verdict.explanation,
        });
    }

    let tools_called = testcase
        .tool_expectations
        .iter()
        .all(|e| tool_was_called(tool_calls, &e.tool_name));
    let assertions_passed = results
        .iter()
        .flat_map(|r| &r.arguments)
        .flat_map(|a| &a.assertions)
        .all(|a| a.passed);

    let (response_quality_result, response_quality_passed, rq_costs) =
        grade_response_quality(client, judge_config, testcase, response, tool_calls, retry_sink).await?;
    cost_records.extend(rq_costs);

    Ok(GradeOutcome {
        tool_expectation_results: results,
        behavior_assertions: Vec::new(),
        response_quality_result,
        passed: tools_called && assertions_passed && response_quality_passed,
        judge_call_duration_seconds: 0.0,
        cost_records,
    })
}

async fn grade_hybrid(
    client: &dyn JudgeClient,
    judge_config: &JudgeConfig,
    testcase: &TestCase,
    response: &str,
    tool_calls: &serde_json::Value,
    retry_sink: &RetrySink,
) -> Result<GradeOutcome, JudgeError> {
    let checklist: Vec<String> = testcase.behavior_assertions.iter().map(|b| b.assertion.clone()).collect();
    let mut cost_records = Vec::new();
    let verdicts = if checklist.is_empty() {
        Vec::new()
    } else {
        let user_prompt = render(
            &judge_config.user_prompt_template_batched,
            &[
                ("test_input", &testcase.input),
                ("test_description", &testcase.description),
                ("tool_name", &actual_tools_list(tool_calls)),
                ("tool_calls_json", &tool_calls.to_string()),
                ("actual_tools", &actual_tools_list(tool_calls)),
                ("assertions_block", &render_checklist(&checklist)),
                ("rubric", &render_rubric(judge_config)),
            ],
        );
        let completion = client.complete(&judge_config.system_prompt, &user_prompt, retry_sink).await?;
        cost_records.push(judge_cost_record(client, &completion, &testcase.tc_id));
        parse_verdicts(&completion.content, checklist.len())
    };

    let behavior_assertions: Vec<BehaviorAssertionResult> = testcase
        .behavior_assertions
        .iter()
        .zip(verdicts)
        .map(|(assertion, verdict)| BehaviorAssertionResult {
            assertion: assertion.assertion.clone(),
            passed: coerce_bool(&verdict.passed),
            llm_judge_output: verdict.explanation,
        })
        .collect();
    let behavior_passed = !behavior_assertions.is_empty() && behavior_assertions.iter().all(|b| b.passed);

    let (response_quality_result, response_quality_passed, rq_costs) =
        grade_response_quality(client, judge_config, testcase, response, tool_calls, retry_sink).await?;
    cost_records.extend(rq_costs);

    Ok(GradeOutcome {
        tool_expectation_results: Vec::new(),
        behavior_assertions,
        response_quality_result,
        passed: behavior_passed && response_quality_passed,
        judge_call_duration_seconds: 0.0,
        cost_records,
    })
}

async fn grade_response_only(
    client: &dyn JudgeClient,
    judge_config: &JudgeConfig,
    testcase: &TestCase,
    response: &str,
    tool_calls: &serde_json::Value,
    retry_sink: &RetrySink,
) -> Result<GradeOutcome, JudgeError> {
    let (response_quality_result, passed, cost_records) =
        grade_response_quality(client, judge_config, testcase, response, tool_calls, retry_sink).await?;

    Ok(GradeOutcome {
        tool_expectation_results: Vec::new(),
        behavior_assertions: Vec::new(),
        response_quality_result,
        passed,
        judge_call_duration_seconds: 0.0,
        cost_records,
    })
}

/// The single-assertion judge call every mode issues (spec §4.4 step 6):
/// grades the response text against `response_quality_expectation`.
async fn grade_response_quality(
    client: &dyn JudgeClient,
    judge_config: &JudgeConfig,
    testcase: &TestCase,
    response: &str,
    tool_calls: &serde_json::Value,
    retry_sink: &RetrySink,
) -> Result<(Option<ResponseQualityResult>, bool, Vec<CostRecord>), JudgeError> {
    let assertion_text = testcase
        .response_quality_expectation
        .as_ref()
        .map(|a| a.assertion.clone())
        .unwrap_or_else(|| format!("The response satisfies: {}", testcase.expected_response));

    let assertion_context = format!(
        "Assertion: {assertion_text}\nExpected response: {}\nActual response: {response}\nActual tool calls: {tool_calls}",
        testcase.expected_response
    );
    let user_prompt = render(
        &judge_config.user_prompt_template_single,
        &[
            ("test_input", &testcase.input),
            ("test_description", &testcase.description),
            ("assertion_context", &assertion_context),
            ("rubric", &render_rubric(judge_config)),
        ],
    );
    let completion = client.complete(&judge_config.system_prompt, &user_prompt, retry_sink).await?;
    let verdict = parse_single_verdict(&completion.content);
    let cost = judge_cost_record(client, &completion, &testcase.tc_id);

    let result = ResponseQualityResult {
        assertion: assertion_text,
        passed: coerce_bool(&verdict.passed),
        llm_judge_output: verdict.explanation,
    };
    let passed = result.passed;

    Ok((Some(result), passed, vec![cost]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::mock::MockJudge;
    use crate::model::{ArgumentAssertion, BehaviorAssertion, JudgeConfig, RubricLevel, ToolExpectation};
    use crate::reconcile::defaults::DEFAULT_BINARY_USER_TEMPLATE_BATCHED;

    fn batched_config() -> JudgeConfig {
        let mut cfg = JudgeConfig::binary("judge_1", 1, "You are a strict grader.");
        cfg.user_prompt_template_batched = "Input: {{test_input}}\nChecks:\n{{assertions_block}}".to_string();
        cfg.user_prompt_template_single = "Input: {{test_input}}\n{{assertion_context}}".to_string();
        cfg
    }

    #[tokio::test]
    async fn tool_level_distributes_batched_verdicts_back_to_arguments() {
        let judge = MockJudge::with_response(r#"[{"passed":true,"explanation":"ok"},{"passed":"no","explanation":"bad arg"}]"#);
        let mut tc = TestCase::new(
            "ds_1",
            "send an email",
            "",
            vec![ToolExpectation {
                tool_name: "sendMail".to_string(),
                arguments: vec![ArgumentAssertion {
                    arg_name: "to".to_string(),
                    assertions: vec!["is a valid address".to_string()],
                }, ArgumentAssertion {
                    arg_name: "subject".to_string(),
                    assertions: vec!["is non-empty".to_string()],
                }],
            }],
            vec![],
            None,
        );
        tc.minimal_tool_set = vec!["sendMail".to_string()];
        let tool_calls = serde_json::json!([{"name": "sendMail", "arguments": {"to": "a@b.com"}}]);
        let retry_sink = RetrySink::new();

        let outcome = grade(&judge, &batched_config(), &tc, "done", &tool_calls, &retry_sink).await.unwrap();
        assert!(!outcome.passed);
        assert!(outcome.tool_expectation_results[0].arguments[0].assertions[0].passed);
        assert!(!outcome.tool_expectation_results[0].arguments[1].assertions[0].passed);
        // one batched call for the argument checklist, one single call for response quality.
        assert_eq!(judge.calls().len(), 2);
        assert_eq!(outcome.cost_records.len(), 2);
    }

    #[tokio::test]
    async fn missing_tool_call_fails_even_with_no_argument_assertions() {
        let judge = MockJudge::with_response("[]");
        let tc = TestCase::new(
            "ds_1",
            "do something",
            "",
            vec![ToolExpectation {
                tool_name: "sendMail".to_string(),
                arguments: vec![],
            }],
            vec![],
            None,
        );
        let tool_calls = serde_json::json!([]);
        let retry_sink = RetrySink::new();
        let outcome = grade(&judge, &batched_config(), &tc, "", &tool_calls, &retry_sink).await.unwrap();
        assert!(!outcome.passed);
        // no argument assertions means no batched call, but response quality still grades.
        assert_eq!(judge.calls().len(), 1);
    }

    #[tokio::test]
    async fn malformed_judge_response_degrades_to_failed_not_error() {
        let judge = MockJudge::with_response("not json at all");
        let tc = TestCase::new(
            "ds_1",
            "x",
            "",
            vec![],
            vec![BehaviorAssertion { assertion: "agent apologizes".to_string() }],
            None,
        );
        let retry_sink = RetrySink::new();
        let outcome = grade(&judge, &batched_config(), &tc, "hi", &serde_json::json!([]), &retry_sink).await.unwrap();
        assert!(!outcome.passed);
        assert!(!outcome.behavior_assertions[0].passed);
        assert_eq!(judge.calls().len(), 2);
    }

    #[tokio::test]
    async fn response_only_without_explicit_assertion_still_grades() {
        let judge = MockJudge::with_response(r#"{"passed":true,"explanation":"matches"}"#);
        let tc = TestCase::new("ds_1", "what's 2+2?", "4", vec![], vec![], None);
        let retry_sink = RetrySink::new();
        let outcome = grade(&judge, &batched_config(), &tc, "4", &serde_json::json!([]), &retry_sink).await.unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.response_quality_result.unwrap().llm_judge_output, "matches");
        assert_eq!(outcome.cost_records[0].tokens_in, 12);
    }

    #[tokio::test]
    async fn tool_level_and_hybrid_both_fail_when_response_quality_fails() {
        let judge = MockJudge::with_responses(vec![
            r#"[{"passed":true,"explanation":"ok"}]"#.to_string(),
            r#"{"passed":false,"explanation":"response is wrong"}"#.to_string(),
        ]);
        let mut tc = TestCase::new(
            "ds_1",
            "send an email",
            "",
            vec![ToolExpectation {
                tool_name: "sendMail".to_string(),
                arguments: vec![ArgumentAssertion {
                    arg_name: "to".to_string(),
                    assertions: vec!["is a valid address".to_string()],
                }],
            }],
            vec![],
            None,
        );
        tc.minimal_tool_set = vec!["sendMail".to_string()];
        let tool_calls = serde_json::json!([{"name": "sendMail", "arguments": {"to": "a@b.com"}}]);
        let retry_sink = RetrySink::new();

        let outcome = grade(&judge, &batched_config(), &tc, "done", &tool_calls, &retry_sink).await.unwrap();
        // every tool-level assertion passed, but response quality failed, so the case still fails.
        assert!(outcome.tool_expectation_results[0].arguments[0].assertions[0].passed);
        assert!(!outcome.passed);
    }

    #[tokio::test]
    async fn batched_prompt_substitutes_the_seeded_placeholder_names() {
        let judge = MockJudge::with_response(r#"[{"passed":true,"explanation":"ok"}]"#);
        let mut cfg = JudgeConfig::binary("judge_1", 1, "grade strictly");
        cfg.user_prompt_template_batched = DEFAULT_BINARY_USER_TEMPLATE_BATCHED.to_string();
        cfg.user_prompt_template_single = "Input: {{test_input}}\n{{assertion_context}}".to_string();
        let mut tc = TestCase::new(
            "ds_1",
            "send an email",
            "",
            vec![ToolExpectation {
                tool_name: "sendMail".to_string(),
                arguments: vec![ArgumentAssertion {
                    arg_name: "to".to_string(),
                    assertions: vec!["is a valid address".to_string()],
                }],
            }],
            vec![],
            None,
        );
        tc.minimal_tool_set = vec!["sendMail".to_string()];
        let tool_calls = serde_json::json!([{"name": "sendMail", "arguments": {"to": "a@b.com"}}]);
        let retry_sink = RetrySink::new();

        let outcome = grade(&judge, &cfg, &tc, "done", &tool_calls, &retry_sink).await.unwrap();
        assert!(outcome.tool_expectation_results[0].arguments[0].assertions[0].passed);

        let (_, batched_prompt) = judge.calls().into_iter().next().unwrap();
        assert!(!batched_prompt.contains("{{"), "unsubstituted placeholder left in: {batched_prompt}");
        assert!(batched_prompt.contains("sendMail"));
        assert!(batched_prompt.contains("send an email"));
    }

    #[tokio::test]
    async fn rubric_mode_renders_criteria_into_the_prompt() {
        let judge = MockJudge::with_response(r#"{"passed":true,"explanation":"meets rubric"}"#);
        let mut cfg = JudgeConfig::binary("judge_1", 1, "grade against the rubric");
        cfg.scoring_mode = ScoringMode::Rubric;
        cfg.rubric = vec![RubricCriterion {
            name: "Click Accuracy".to_string(),
            description: "Did the agent click the correct element?".to_string(),
            levels: vec![
                RubricLevel { score: 1, description: "Wrong element clicked".to_string() },
                RubricLevel { score: 5, description: "Correct element clicked".to_string() },
            ],
        }];
        cfg.user_prompt_template_single = "Rubric:\n{{rubric}}\n{{assertion_context}}".to_string();
        let tc = TestCase::new("ds_1", "click submit", "submitted", vec![], vec![], None);
        let retry_sink = RetrySink::new();

        let outcome = grade(&judge, &cfg, &tc, "submitted", &serde_json::json!([]), &retry_sink).await.unwrap();
        assert!(outcome.passed);

        let (_, prompt) = judge.calls().into_iter().next().unwrap();
        assert!(prompt.contains("Click Accuracy"));
        assert!(prompt.contains("Correct element clicked"));
    }
}
