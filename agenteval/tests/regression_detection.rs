//! A test case that passed in an agent's last completed run on a dataset,
//! then fails in the next run against the same pair, is recorded as a
//! regression (spec glossary "Regression", §4.5).

use std::sync::Arc;
use std::time::Duration;

use agenteval::config::EngineConfig;
use agenteval::coordinator::RunCoordinator;
use agenteval::dispatcher::{AgentClient, MockAgent};
use agenteval::judge::{JudgeClient, MockJudge};
use agenteval::model::{Agent, Dataset, EvaluationRun, JudgeConfig, PromptVersion, TestCase};
use agenteval::store::SqliteStore;

async fn seeded_store() -> (Arc<SqliteStore>, String, String) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::new(dir.path().join("regression.db")).unwrap());

    let agent = Agent::new("regression-agent", "http://localhost:9/invoke", "gpt");
    store.put_agent(&agent).await.unwrap();
    let pv = PromptVersion::new(agent.agent_id.clone(), 1, "You are helpful.");
    store.put_prompt_version(&pv).await.unwrap();
    store.set_active_prompt_version(&agent.agent_id, 1).await.unwrap();

    let dataset = Dataset::new("regression-ds", "arithmetic");
    store.put_dataset(&dataset).await.unwrap();
    let tc = TestCase::new(dataset.dataset_id.clone(), "2+2?", "4", vec![], vec![], None);
    store.put_testcase(&tc).await.unwrap();

    let mut cfg = JudgeConfig::binary("default", 1, "grade strictly");
    cfg.user_prompt_template_single = "Input: {{test_input}}\n{{assertion_context}}".to_string();
    store.put_judge_config(&cfg).await.unwrap();
    store.set_active_judge_config("default", 1).await.unwrap();

    (store, agent.agent_id, dataset.dataset_id)
}

async fn wait_for_terminal(store: &SqliteStore, eval_id: &str) -> EvaluationRun {
    for _ in 0..200 {
        let run = store.get_run(eval_id).await.unwrap();
        if run.status.is_terminal() {
            return run;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run '{eval_id}' never reached a terminal state");
}

#[tokio::test]
async fn a_case_that_regresses_from_passing_to_failing_is_flagged() {
    let (store, agent_id, dataset_id) = seeded_store().await;
    let config = EngineConfig::from_env();

    // First run: the agent answers correctly and the judge passes it.
    let agent_client: Arc<dyn AgentClient> = Arc::new(MockAgent::with_response("4", serde_json::json!([])));
    let judge_client: Arc<dyn JudgeClient> = Arc::new(MockJudge::with_response(r#"{"passed":true,"explanation":"correct"}"#));
    let coordinator = RunCoordinator::new(store.clone(), agent_client, judge_client, &config);
    let first_eval_id = coordinator.start_run(&agent_id, &dataset_id, Some(5)).await.unwrap();
    let first_run = wait_for_terminal(&store, &first_eval_id).await;
    assert!(first_run.regressions.is_empty());
    assert_eq!(first_run.passed_count, 1);

    // Second run against the same agent/dataset pair: now the judge fails it.
    let agent_client: Arc<dyn AgentClient> = Arc::new(MockAgent::with_response("5", serde_json::json!([])));
    let judge_client: Arc<dyn JudgeClient> = Arc::new(MockJudge::with_response(r#"{"passed":false,"explanation":"wrong"}"#));
    let coordinator = RunCoordinator::new(store.clone(), agent_client, judge_client, &config);
    let second_eval_id = coordinator.start_run(&agent_id, &dataset_id, Some(5)).await.unwrap();
    let second_run = wait_for_terminal(&store, &second_eval_id).await;

    assert_eq!(second_run.failed_tests, 1);
    assert_eq!(second_run.regressions.len(), 1);
    assert_eq!(second_run.regressions[0].previous_result, "passed");
    assert_eq!(second_run.regressions[0].current_result, "failed");
}

#[tokio::test]
async fn a_case_that_fails_in_both_runs_is_not_a_regression() {
    let (store, agent_id, dataset_id) = seeded_store().await;
    let config = EngineConfig::from_env();

    let agent_client: Arc<dyn AgentClient> = Arc::new(MockAgent::with_response("5", serde_json::json!([])));
    let judge_client: Arc<dyn JudgeClient> = Arc::new(MockJudge::with_response(r#"{"passed":false,"explanation":"wrong"}"#));
    let coordinator = RunCoordinator::new(store.clone(), agent_client, judge_client, &config);
    let first_eval_id = coordinator.start_run(&agent_id, &dataset_id, Some(5)).await.unwrap();
    wait_for_terminal(&store, &first_eval_id).await;

    let agent_client: Arc<dyn AgentClient> = Arc::new(MockAgent::with_response("5", serde_json::json!([])));
    let judge_client: Arc<dyn JudgeClient> = Arc::new(MockJudge::with_response(r#"{"passed":false,"explanation":"still wrong"}"#));
    let coordinator = RunCoordinator::new(store.clone(), agent_client, judge_client, &config);
    let second_eval_id = coordinator.start_run(&agent_id, &dataset_id, Some(5)).await.unwrap();
    let second_run = wait_for_terminal(&store, &second_eval_id).await;

    assert!(second_run.regressions.is_empty());
}
