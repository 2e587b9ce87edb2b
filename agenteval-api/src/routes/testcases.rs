use agenteval::model::{AssertionMode, BehaviorAssertion, TestCase, ToolExpectation};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateTestCaseRequest {
    pub input: String,
    pub expected_response: String,
    #[serde(default)]
    pub tool_expectations: Vec<ToolExpectation>,
    #[serde(default)]
    pub behavior_assertions: Vec<BehaviorAssertion>,
    #[serde(default)]
    pub assertion_mode: Option<AssertionMode>,
}

pub async fn create(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
    Json(req): Json<CreateTestCaseRequest>,
) -> Result<Json<TestCase>, ApiError> {
    state.store.get_dataset(&dataset_id).await?;
    let testcase = TestCase::new(
        dataset_id,
        req.input,
        req.expected_response,
        req.tool_expectations,
        req.behavior_assertions,
        req.assertion_mode,
    );
    state.store.put_testcase(&testcase).await?;
    Ok(Json(testcase))
}

pub async fn list(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
) -> Result<Json<Vec<TestCase>>, ApiError> {
    Ok(Json(state.store.list_testcases_by_dataset(&dataset_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path((_dataset_id, tc_id)): Path<(String, String)>,
) -> Result<Json<TestCase>, ApiError> {
    Ok(Json(state.store.get_testcase(&tc_id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((_dataset_id, tc_id)): Path<(String, String)>,
) -> Result<(), ApiError> {
    state.store.delete_testcase(&tc_id).await?;
    Ok(())
}
