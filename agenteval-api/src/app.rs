//! Axum app: shared state and router assembly, following the teacher's
//! `serve::app` split of `AppState` + `router(state)`.

use std::sync::Arc;

use agenteval::coordinator::RunCoordinator;
use agenteval::proposal::ProposalGenerator;
use agenteval::store::SqliteStore;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub coordinator: Arc<RunCoordinator>,
    pub proposals: Arc<ProposalGenerator>,
}

/// Builds the router. `cors_origins` is the parsed `CORS_ORIGINS` env
/// value (empty = permissive, matching local-dev defaults).
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    };

    Router::new()
        .route("/api/datasets", post(routes::datasets::create).get(routes::datasets::list))
        .route("/api/datasets/:id", get(routes::datasets::get).delete(routes::datasets::delete))
        .route(
            "/api/datasets/:id/testcases",
            post(routes::testcases::create).get(routes::testcases::list),
        )
        .route(
            "/api/datasets/:id/testcases/:tcid",
            get(routes::testcases::get).delete(routes::testcases::delete),
        )
        .route("/api/agents", post(routes::agents::create).get(routes::agents::list))
        .route(
            "/api/agents/:id",
            get(routes::agents::get).patch(routes::agents::update).delete(routes::agents::delete),
        )
        .route(
            "/api/agents/:id/prompts",
            post(routes::agents::create_prompt).get(routes::agents::list_prompts),
        )
        .route("/api/agents/:id/prompts/:version/activate", post(routes::agents::activate_prompt))
        .route(
            "/api/judge-configs",
            post(routes::judge_configs::create).get(routes::judge_configs::list),
        )
        .route(
            "/api/judge-configs/:id/versions/:version/activate",
            post(routes::judge_configs::activate),
        )
        .route("/api/evaluations", post(routes::evaluations::launch).get(routes::evaluations::list))
        .route("/api/evaluations/:id", get(routes::evaluations::get))
        .route("/api/evaluations/:id/cancel", post(routes::evaluations::cancel))
        .route("/api/evaluations/:id/re-evaluate", post(routes::evaluations::re_evaluate))
        .route(
            "/api/evaluations/:id/testcases/:tcid/annotation",
            post(routes::annotations::put_run_annotation).get(routes::annotations::get_run_annotation),
        )
        .route(
            "/api/evaluations/:id/testcases/:tcid/actions",
            post(routes::annotations::put_action_annotation).get(routes::annotations::list_action_annotations),
        )
        .route("/api/agents/:id/proposals", get(routes::proposals::list_for_agent))
        .route("/api/agents/:id/proposals/generate", post(routes::proposals::generate))
        .route("/api/proposals/:id/apply", post(routes::proposals::apply))
        .route("/api/proposals/:id/dismiss", post(routes::proposals::dismiss))
        .route("/api/admin/reset", post(routes::admin::reset))
        .route("/api/admin/seed-demo", post(routes::admin::seed_demo))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
