//! Thin axum HTTP surface over [`agenteval`] (spec §6 "API surface").
//!
//! Handlers translate to/from the core engine's types; all business logic
//! (run lifecycle, grading, proposal synthesis, reconciliation) lives in
//! `agenteval` itself. Mirrors the teacher's `serve` crate's `run_serve` /
//! `run_serve_on_listener` split so tests can bind an ephemeral port.

pub mod app;
pub mod error;
pub mod routes;

use std::sync::Arc;

use agenteval::config::EngineConfig;
use agenteval::coordinator::RunCoordinator;
use agenteval::dispatcher::HttpAgentClient;
use agenteval::judge::LlmJudge;
use agenteval::proposal::ProposalGenerator;
use agenteval::reconcile::StartupReconciler;
use agenteval::retry::RetryPolicy;
use agenteval::store::SqliteStore;
use tokio::net::TcpListener;
use tracing::info;

pub use app::{router, AppState};

fn cors_origins_from_env() -> Vec<String> {
    std::env::var("CORS_ORIGINS")
        .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Builds the store, engine collaborators, and reconciles startup state.
/// Shared by [`run_serve`] and tests that want a real `AppState` without
/// going through a `TcpListener`.
pub async fn build_state(config: &EngineConfig) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let store = Arc::new(SqliteStore::new(&config.store_db_path)?);

    let reconciler = StartupReconciler::new(store.clone());
    let report = reconciler.reconcile().await?;
    info!(
        agents_seeded = report.agents_seeded,
        judge_configs_seeded = report.judge_configs_seeded,
        system_prompts_seeded = report.system_prompts_seeded,
        runs_swept = report.runs_swept,
        "startup reconciliation complete"
    );

    let retry = RetryPolicy::from(config);
    let agent_client: Arc<dyn agenteval::dispatcher::AgentClient> = Arc::new(HttpAgentClient::new(retry));
    let judge_client: Arc<dyn agenteval::judge::JudgeClient> = Arc::new(LlmJudge::new(
        config.judge_base_url.clone(),
        config.judge_api_key.clone(),
        config.judge_model.clone(),
        retry,
    ));

    let coordinator = Arc::new(RunCoordinator::new(store.clone(), agent_client, judge_client.clone(), config));
    let proposals = Arc::new(ProposalGenerator::new(store.clone(), judge_client, config.judge_model.clone()));

    Ok(AppState { store, coordinator, proposals })
}

/// Runs the HTTP server on an existing listener. Used by tests (bind to
/// 127.0.0.1:0, then pass the listener in) and by [`run_serve`].
pub async fn run_serve_on_listener(
    listener: TcpListener,
    config: EngineConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    let cors_origins = cors_origins_from_env();
    let state = build_state(&config).await?;
    let app = router(state, &cors_origins);

    info!(%addr, "agenteval-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Runs the HTTP server on `addr` (default `127.0.0.1:8080`).
pub async fn run_serve(addr: Option<&str>, config: EngineConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = addr.unwrap_or("127.0.0.1:8080");
    let listener = TcpListener::bind(addr).await?;
    run_serve_on_listener(listener, config).await
}
