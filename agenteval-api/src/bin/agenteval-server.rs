//! Binary entry point: installs tracing, loads config, and serves
//! `agenteval-api` on a bound `TcpListener` (spec §0.1, following the
//! teacher's `serve`/`cli` binary wiring).

use agenteval::config::EngineConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "agenteval=info".into()))
        .init();

    let config = EngineConfig::from_env();
    let addr = std::env::var("AGENTEVAL_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    agenteval_api::run_serve(Some(&addr), config).await
}
