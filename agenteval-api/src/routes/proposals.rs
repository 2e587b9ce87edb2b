use agenteval::model::{PromptProposal, PromptVersion, ProposalStatus};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

pub async fn list_for_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<PromptProposal>>, ApiError> {
    Ok(Json(state.store.list_proposals_by_agent(&agent_id).await?))
}

#[derive(Deserialize, Default)]
pub struct GenerateProposalsRequest {
    #[serde(default)]
    pub prompt_version: Option<u32>,
}

pub async fn generate(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    body: Option<Json<GenerateProposalsRequest>>,
) -> Result<Json<Vec<PromptProposal>>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let proposals = state.proposals.generate_for_agent(&agent_id, req.prompt_version).await?;
    Ok(Json(proposals))
}

pub async fn apply(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<PromptVersion>, ApiError> {
    Ok(Json(state.proposals.apply_proposal(&id).await?))
}

pub async fn dismiss(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), ApiError> {
    let mut proposal = state.store.get_proposal(&id).await?;
    proposal.status = ProposalStatus::Dismissed;
    state.store.put_proposal(&proposal).await?;
    Ok(())
}
