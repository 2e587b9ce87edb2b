use agenteval::model::EvaluationRun;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct LaunchRunRequest {
    pub agent_id: String,
    pub dataset_id: String,
    #[serde(default)]
    pub timeout_override_secs: Option<u64>,
}

#[derive(serde::Serialize)]
pub struct LaunchRunResponse {
    pub eval_id: String,
}

pub async fn launch(
    State(state): State<AppState>,
    Json(req): Json<LaunchRunRequest>,
) -> Result<Json<LaunchRunResponse>, ApiError> {
    let eval_id = state
        .coordinator
        .start_run(&req.agent_id, &req.dataset_id, req.timeout_override_secs)
        .await?;
    Ok(Json(LaunchRunResponse { eval_id }))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<EvaluationRun>>, ApiError> {
    let mut out = Vec::new();
    for agent in state.store.list_agents().await? {
        out.extend(state.store.list_runs_by_agent(&agent.agent_id).await?);
    }
    Ok(Json(out))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<EvaluationRun>, ApiError> {
    Ok(Json(state.store.get_run(&id).await?))
}

pub async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), ApiError> {
    state.coordinator.cancel_run(&id).await?;
    Ok(())
}

/// Re-launches a completed run's `(agent_id, dataset_id)` pair against the
/// agent's currently-active prompt version (spec §6 `re-evaluate`): a new
/// independent run, not a mutation of the original.
pub async fn re_evaluate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LaunchRunResponse>, ApiError> {
    let previous = state.store.get_run(&id).await?;
    let eval_id = state
        .coordinator
        .start_run(&previous.agent_id, &previous.dataset_id, Some(previous.timeout_seconds))
        .await?;
    Ok(Json(LaunchRunResponse { eval_id }))
}
