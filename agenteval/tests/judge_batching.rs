//! Confirms the judge makes exactly one batched call per test case
//! regardless of how many checks that case carries — the behavior the
//! spec's "batched" templates exist for.

use agenteval::dispatcher::MockAgent;
use agenteval::evaluator::TestCaseEvaluator;
use agenteval::judge::MockJudge;
use agenteval::model::{ArgumentAssertion, BehaviorAssertion, JudgeConfig, TestCase, ToolExpectation};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn batched_config() -> JudgeConfig {
    let mut cfg = JudgeConfig::binary("judge_1", 1, "You are a strict grader.");
    cfg.user_prompt_template_batched = "Input: {{input}}\nChecks:\n{{checks}}".to_string();
    cfg.user_prompt_template_single = "Input: {{input}}\nAssertion: {{assertion}}\nResponse: {{response}}".to_string();
    cfg
}

#[tokio::test]
async fn tool_level_case_with_many_checks_issues_a_single_judge_call() {
    let agent = MockAgent::with_response("done", serde_json::json!([{"name": "sendMail", "arguments": {}}]));
    let judge = MockJudge::with_response(
        r#"[{"passed":true,"explanation":"ok"},{"passed":true,"explanation":"ok"},{"passed":true,"explanation":"ok"}]"#,
    );
    let evaluator = TestCaseEvaluator::new(&agent, &judge);

    let tc = TestCase::new(
        "ds_1",
        "send an email",
        "",
        vec![ToolExpectation {
            tool_name: "sendMail".to_string(),
            arguments: vec![
                ArgumentAssertion { arg_name: "to".to_string(), assertions: vec!["is a valid address".to_string()] },
                ArgumentAssertion { arg_name: "subject".to_string(), assertions: vec!["is non-empty".to_string()] },
                ArgumentAssertion { arg_name: "body".to_string(), assertions: vec!["mentions the meeting".to_string()] },
            ],
        }],
        vec![],
        None,
    );
    let cancel = CancellationToken::new();

    let outcome = evaluator.evaluate(&tc, "http://agent", &batched_config(), Duration::from_secs(5), &cancel).await;

    assert!(outcome.result.passed);
    assert_eq!(judge.calls().len(), 1, "all three argument checks should fit in one batched call");
    let (_, user_prompt) = &judge.calls()[0];
    assert!(user_prompt.contains("is a valid address"));
    assert!(user_prompt.contains("is non-empty"));
    assert!(user_prompt.contains("mentions the meeting"));
}

#[tokio::test]
async fn hybrid_case_with_many_behavior_assertions_issues_a_single_judge_call() {
    let agent = MockAgent::with_response("I've sent the email and confirmed delivery.", serde_json::json!([]));
    let judge = MockJudge::with_response(
        r#"[{"passed":true,"explanation":"sent"},{"passed":true,"explanation":"confirmed"}]"#,
    );
    let evaluator = TestCaseEvaluator::new(&agent, &judge);

    let tc = TestCase::new(
        "ds_1",
        "send the email and confirm it",
        "",
        vec![],
        vec![
            BehaviorAssertion { assertion: "agent confirms the email was sent".to_string() },
            BehaviorAssertion { assertion: "agent confirms delivery".to_string() },
        ],
        None,
    );
    let cancel = CancellationToken::new();

    let outcome = evaluator.evaluate(&tc, "http://agent", &batched_config(), Duration::from_secs(5), &cancel).await;

    assert!(outcome.result.passed);
    assert_eq!(judge.calls().len(), 1);
    assert_eq!(outcome.result.behavior_assertions.len(), 2);
}

#[tokio::test]
async fn response_only_case_uses_the_single_template_not_the_batched_one() {
    let agent = MockAgent::with_response("4", serde_json::json!([]));
    let judge = MockJudge::with_response(r#"{"passed":true,"explanation":"matches"}"#);
    let evaluator = TestCaseEvaluator::new(&agent, &judge);

    let tc = TestCase::new("ds_1", "2+2?", "4", vec![], vec![], None);
    let cancel = CancellationToken::new();

    let outcome = evaluator.evaluate(&tc, "http://agent", &batched_config(), Duration::from_secs(5), &cancel).await;

    assert!(outcome.result.passed);
    let (_, user_prompt) = &judge.calls()[0];
    assert!(user_prompt.starts_with("Input: 2+2?\nAssertion:"));
}
