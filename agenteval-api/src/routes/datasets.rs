use agenteval::model::Dataset;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateDatasetRequest {
    pub name: String,
    pub goal: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateDatasetRequest>,
) -> Result<Json<Dataset>, ApiError> {
    let dataset = Dataset::new(req.name, req.goal);
    state.store.put_dataset(&dataset).await?;
    Ok(Json(dataset))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Dataset>>, ApiError> {
    Ok(Json(state.store.list_datasets().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Dataset>, ApiError> {
    Ok(Json(state.store.get_dataset(&id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), ApiError> {
    state.store.delete_dataset(&id).await?;
    Ok(())
}
