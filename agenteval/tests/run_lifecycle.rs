//! End-to-end run lifecycle through `RunCoordinator`, exercising the same
//! path `agenteval-api`'s `/api/evaluations` routes drive in production:
//! launch, poll to completion, cancel.

use std::sync::Arc;
use std::time::Duration;

use agenteval::config::EngineConfig;
use agenteval::coordinator::RunCoordinator;
use agenteval::dispatcher::{AgentClient, MockAgent};
use agenteval::judge::{JudgeClient, MockJudge};
use agenteval::model::{Agent, Dataset, JudgeConfig, PromptVersion, RunStatus, TestCase};
use agenteval::store::SqliteStore;

async fn seeded_store() -> (Arc<SqliteStore>, String, String) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::new(dir.path().join("lifecycle.db")).unwrap());

    let agent = Agent::new("lifecycle-agent", "http://localhost:9/invoke", "gpt");
    store.put_agent(&agent).await.unwrap();
    let pv = PromptVersion::new(agent.agent_id.clone(), 1, "You are helpful.");
    store.put_prompt_version(&pv).await.unwrap();
    store.set_active_prompt_version(&agent.agent_id, 1).await.unwrap();

    let dataset = Dataset::new("lifecycle-ds", "arithmetic");
    store.put_dataset(&dataset).await.unwrap();
    for (input, expected) in [("2+2?", "4"), ("3+3?", "6")] {
        let tc = TestCase::new(dataset.dataset_id.clone(), input, expected, vec![], vec![], None);
        store.put_testcase(&tc).await.unwrap();
    }

    let mut cfg = JudgeConfig::binary("default", 1, "grade strictly");
    cfg.user_prompt_template_single = "Input: {{test_input}}\n{{assertion_context}}".to_string();
    store.put_judge_config(&cfg).await.unwrap();
    store.set_active_judge_config("default", 1).await.unwrap();

    (store, agent.agent_id, dataset.dataset_id)
}

async fn wait_for_terminal(store: &SqliteStore, eval_id: &str) -> agenteval::model::EvaluationRun {
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
async fn launch_runs_every_testcase_and_completes() {
    let (store, agent_id, dataset_id) = seeded_store().await;
    let agent_client: Arc<dyn AgentClient> = Arc::new(MockAgent::with_response("4", serde_json::json!([])));
    let judge_client: Arc<dyn JudgeClient> = Arc::new(MockJudge::with_response(r#"{"passed":true,"explanation":"ok"}"#));
    let config = EngineConfig::from_env();
    let coordinator = RunCoordinator::new(store.clone(), agent_client, judge_client, &config);

    let eval_id = coordinator.start_run(&agent_id, &dataset_id, Some(5)).await.unwrap();
    let run = wait_for_terminal(&store, &eval_id).await;

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.total_tests, 2);
    assert_eq!(run.completed_tests, 2);
    assert!(run.started_at.is_some());
    assert!(run.completed_at.is_some());
}

#[tokio::test]
async fn launch_with_unknown_agent_fails_before_persisting_a_run() {
    let (store, _agent_id, dataset_id) = seeded_store().await;
    let agent_client: Arc<dyn AgentClient> = Arc::new(MockAgent::with_response("4", serde_json::json!([])));
    let judge_client: Arc<dyn JudgeClient> = Arc::new(MockJudge::with_response("{}"));
    let config = EngineConfig::from_env();
    let coordinator = RunCoordinator::new(store, agent_client, judge_client, &config);

    let result = coordinator.start_run("nonexistent-agent", &dataset_id, None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn cancel_stops_a_run_before_every_testcase_runs() {
    let (store, agent_id, dataset_id) = seeded_store().await;
    // A bit of per-call latency gives the test a window to cancel mid-run.
    let agent_client: Arc<dyn AgentClient> = Arc::new(MockAgent::with_response("4", serde_json::json!([])));
    let judge_client: Arc<dyn JudgeClient> = Arc::new(MockJudge::with_response(r#"{"passed":true,"explanation":"ok"}"#));
    let config = EngineConfig::from_env();
    let coordinator = RunCoordinator::new(store.clone(), agent_client, judge_client, &config);

    let eval_id = coordinator.start_run(&agent_id, &dataset_id, Some(5)).await.unwrap();
    coordinator.cancel_run(&eval_id).await.unwrap();
    let run = wait_for_terminal(&store, &eval_id).await;

    assert!(matches!(run.status, RunStatus::Cancelled | RunStatus::Completed));
}

#[tokio::test]
async fn cancelling_an_already_finished_run_is_not_found() {
    let (store, agent_id, dataset_id) = seeded_store().await;
    let agent_client: Arc<dyn AgentClient> = Arc::new(MockAgent::with_response("4", serde_json::json!([])));
    let judge_client: Arc<dyn JudgeClient> = Arc::new(MockJudge::with_response(r#"{"passed":true,"explanation":"ok"}"#));
    let config = EngineConfig::from_env();
    let coordinator = RunCoordinator::new(store.clone(), agent_client, judge_client, &config);

    let eval_id = coordinator.start_run(&agent_id, &dataset_id, Some(5)).await.unwrap();
    wait_for_terminal(&store, &eval_id).await;

    assert!(coordinator.cancel_run(&eval_id).await.is_err());
}
