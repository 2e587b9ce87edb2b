//! Maps `agenteval`'s typed component errors onto the HTTP status codes
//! the error taxonomy (spec §7) calls for. Handlers stay thin — they
//! propagate a component error with `?` and this is the only place that
//! decides status codes.

use agenteval::error::{EvalError, ProposalError, ReconcileError, StoreError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self { status: StatusCode::CONFLICT, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::not_found(msg),
            other => ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: other.to_string() },
        }
    }
}

impl From<EvalError> for ApiError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Store(store_err) => store_err.into(),
        }
    }
}

impl From<ProposalError> for ApiError {
    fn from(err: ProposalError) -> Self {
        let message = err.to_string();
        match err {
            ProposalError::Store(store_err) => store_err.into(),
            ProposalError::Judge(judge_err) => {
                ApiError { status: StatusCode::BAD_GATEWAY, message: judge_err.to_string() }
            }
            ProposalError::NoAnnotations => ApiError::bad_request(message),
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Store(store_err) => store_err.into(),
        }
    }
}
