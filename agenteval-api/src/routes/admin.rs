use agenteval::model::{Agent, BehaviorAssertion, Dataset, PromptVersion, TestCase};
use axum::extract::State;

use crate::app::AppState;
use crate::error::ApiError;

/// Wipes every resettable table (spec §6 `POST /api/admin/reset`). Meant
/// for test/demo environments — `agenteval-api` does not gate this behind
/// auth; operators are expected to put it behind their own.
pub async fn reset(State(state): State<AppState>) -> Result<(), ApiError> {
    state.store.reset_all_data().await?;
    Ok(())
}

/// Seeds one demo agent, dataset, and test case so a fresh install has
/// something to run immediately (spec §6 `POST /api/admin/seed-demo`).
pub async fn seed_demo(State(state): State<AppState>) -> Result<(), ApiError> {
    let agent = Agent::new("Demo Echo Agent", "http://localhost:8001/invoke", "demo");
    state.store.put_agent(&agent).await?;
    let prompt = PromptVersion::new(agent.agent_id.clone(), 1, "You are a helpful assistant. Answer concisely.");
    state.store.put_prompt_version(&prompt).await?;
    state.store.set_active_prompt_version(&agent.agent_id, 1).await?;

    let dataset = Dataset::new("Demo Dataset", "Sanity-check the evaluation pipeline end to end.");
    state.store.put_dataset(&dataset).await?;
    let testcase = TestCase::new(
        dataset.dataset_id.clone(),
        "What is 2 + 2?",
        "4",
        vec![],
        vec![BehaviorAssertion { assertion: "Response states the answer is 4.".to_string() }],
        None,
    );
    state.store.put_testcase(&testcase).await?;
    Ok(())
}
