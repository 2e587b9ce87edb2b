//! Per-component error types (spec §7 "Error taxonomy").
//!
//! One `thiserror` enum per component boundary, following the teacher's
//! convention of typed errors at each module rather than a single
//! crate-wide enum. `agenteval-api` maps these onto HTTP status codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("agent call timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("rate limited after exhausting retries")]
    RateLimited,
    #[error("dispatch cancelled")]
    Cancelled,
    #[error("could not decode agent response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("transport error: {0}")]
    Transport(#[from] async_openai::error::OpenAIError),
    #[error("rate limited after exhausting retries")]
    RateLimited,
    #[error("judge call cancelled")]
    Cancelled,
}

/// Only fatal infrastructure errors propagate out of evaluation (spec §4.4,
/// §4.5): a store write failure is the sole case that bubbles as `Err`
/// rather than being recorded inline on the run.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Judge(#[from] JudgeError),
    #[error("no annotations available to synthesize a proposal from")]
    NoAnnotations,
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
