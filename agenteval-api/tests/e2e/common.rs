//! Shared helpers for e2e tests: spawns `agenteval-api` on an ephemeral
//! port backed by a fresh on-disk store, the HTTP analogue of the
//! teacher's `spawn_server_once` websocket helper.

use agenteval::config::EngineConfig;
use tokio::net::TcpListener;

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    _db_dir: tempfile::TempDir,
    handle: tokio::task::JoinHandle<Result<(), Box<dyn std::error::Error + Send + Sync>>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Binds to a random port, runs reconciliation against a fresh tempfile
/// database, and serves until the returned handle is dropped/aborted.
pub async fn spawn_server() -> TestServer {
    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("e2e.db");

    let mut config = EngineConfig::from_env();
    config.store_db_path = db_path.to_string_lossy().to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(agenteval_api::run_serve_on_listener(listener, config));

    // Give the spawned task a moment to bind and finish reconciliation.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    TestServer {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        _db_dir: db_dir,
        handle,
    }
}
