use agenteval::model::{Agent, PromptVersion};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub endpoint_url: String,
    pub model_label: String,
}

pub async fn create(State(state): State<AppState>, Json(req): Json<CreateAgentRequest>) -> Result<Json<Agent>, ApiError> {
    let agent = Agent::new(req.name, req.endpoint_url, req.model_label);
    state.store.put_agent(&agent).await?;
    Ok(Json(agent))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Agent>>, ApiError> {
    Ok(Json(state.store.list_agents().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Agent>, ApiError> {
    Ok(Json(state.store.get_agent(&id).await?))
}

#[derive(Deserialize)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub endpoint_url: Option<String>,
    pub team: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAgentRequest>,
) -> Result<Json<Agent>, ApiError> {
    let mut agent = state.store.get_agent(&id).await?;
    if let Some(name) = req.name {
        agent.name = name;
    }
    if let Some(description) = req.description {
        agent.description = description;
    }
    if let Some(endpoint_url) = req.endpoint_url {
        agent.endpoint_url = endpoint_url;
    }
    if let Some(team) = req.team {
        agent.team = Some(team);
    }
    if let Some(tags) = req.tags {
        agent.tags = tags;
    }
    agent.updated_at = chrono::Utc::now();
    state.store.put_agent(&agent).await?;
    Ok(Json(agent))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), ApiError> {
    state.store.delete_agent(&id).await?;
    Ok(())
}

#[derive(Deserialize)]
pub struct CreatePromptRequest {
    pub system_prompt: String,
    #[serde(default)]
    pub author_notes: String,
}

pub async fn create_prompt(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(req): Json<CreatePromptRequest>,
) -> Result<Json<PromptVersion>, ApiError> {
    state.store.get_agent(&agent_id).await?;
    let version = state.store.next_prompt_version(&agent_id).await?;
    let mut prompt = PromptVersion::new(agent_id, version, req.system_prompt);
    prompt.author_notes = req.author_notes;
    state.store.put_prompt_version(&prompt).await?;
    Ok(Json(prompt))
}

pub async fn list_prompts(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<PromptVersion>>, ApiError> {
    Ok(Json(state.store.list_prompt_versions(&agent_id).await?))
}

pub async fn activate_prompt(
    State(state): State<AppState>,
    Path((agent_id, version)): Path<(String, u32)>,
) -> Result<(), ApiError> {
    state.store.set_active_prompt_version(&agent_id, version).await?;
    Ok(())
}
