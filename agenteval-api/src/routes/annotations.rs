use agenteval::model::{ActionAnnotation, Efficiency, RunAnnotation};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct PutRunAnnotationRequest {
    pub outcome: u8,
    pub efficiency: Efficiency,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

pub async fn put_run_annotation(
    State(state): State<AppState>,
    Path((evaluation_id, testcase_id)): Path<(String, String)>,
    Json(req): Json<PutRunAnnotationRequest>,
) -> Result<Json<RunAnnotation>, ApiError> {
    let annotation = RunAnnotation {
        evaluation_id,
        testcase_id,
        outcome: req.outcome,
        efficiency: req.efficiency,
        issues: req.issues,
        notes: req.notes,
        created_at: chrono::Utc::now(),
    };
    state.store.put_run_annotation(&annotation).await?;
    Ok(Json(annotation))
}

pub async fn get_run_annotation(
    State(state): State<AppState>,
    Path((evaluation_id, testcase_id)): Path<(String, String)>,
) -> Result<Json<Option<RunAnnotation>>, ApiError> {
    Ok(Json(state.store.get_run_annotation(&evaluation_id, &testcase_id).await?))
}

#[derive(Deserialize)]
pub struct PutActionAnnotationRequest {
    pub action_index: usize,
    pub correctness: u8,
    pub parameter_quality: u8,
    pub info_utilization: u8,
    #[serde(default)]
    pub error_contributor: bool,
    #[serde(default)]
    pub correction: Option<String>,
}

pub async fn put_action_annotation(
    State(state): State<AppState>,
    Path((evaluation_id, testcase_id)): Path<(String, String)>,
    Json(req): Json<PutActionAnnotationRequest>,
) -> Result<Json<ActionAnnotation>, ApiError> {
    let annotation = ActionAnnotation {
        evaluation_id,
        testcase_id,
        action_index: req.action_index,
        correctness: req.correctness,
        parameter_quality: req.parameter_quality,
        info_utilization: req.info_utilization,
        error_contributor: req.error_contributor,
        correction: req.correction,
        created_at: chrono::Utc::now(),
    };
    state.store.put_action_annotation(&annotation).await?;
    Ok(Json(annotation))
}

pub async fn list_action_annotations(
    State(state): State<AppState>,
    Path((evaluation_id, testcase_id)): Path<(String, String)>,
) -> Result<Json<Vec<ActionAnnotation>>, ApiError> {
    Ok(Json(state.store.list_action_annotations(&evaluation_id, &testcase_id).await?))
}
