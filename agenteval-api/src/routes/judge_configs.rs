use agenteval::model::{JudgeConfig, RubricCriterion, ScoringMode};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateJudgeConfigRequest {
    pub judge_config_id: String,
    pub name: String,
    pub scoring_mode: ScoringMode,
    #[serde(default)]
    pub pass_threshold: Option<f64>,
    #[serde(default)]
    pub rubric: Vec<RubricCriterion>,
    pub system_prompt: String,
    #[serde(default)]
    pub user_prompt_template_single: String,
    #[serde(default)]
    pub user_prompt_template_batched: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateJudgeConfigRequest>,
) -> Result<Json<JudgeConfig>, ApiError> {
    let version = state.store.next_judge_config_version(&req.judge_config_id).await?;
    let config = JudgeConfig {
        judge_config_id: req.judge_config_id,
        version,
        name: req.name,
        is_active: false,
        scoring_mode: req.scoring_mode,
        pass_threshold: req.pass_threshold,
        rubric: req.rubric,
        system_prompt: req.system_prompt,
        user_prompt_template_single: req.user_prompt_template_single,
        user_prompt_template_batched: req.user_prompt_template_batched,
        notes: String::new(),
        created_at: chrono::Utc::now(),
    };
    state.store.put_judge_config(&config).await?;
    Ok(Json(config))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<JudgeConfig>>, ApiError> {
    let mut out = Vec::new();
    for id in state.store.list_judge_config_ids().await? {
        out.extend(state.store.list_judge_config_versions(&id).await?);
    }
    Ok(Json(out))
}

pub async fn activate(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, u32)>,
) -> Result<(), ApiError> {
    state.store.set_active_judge_config(&id, version).await?;
    Ok(())
}
