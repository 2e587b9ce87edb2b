//! SQLite-backed persistence for every entity in [`crate::model`]
//! (spec §4.1 "Store").
//!
//! Follows the teacher's `SqliteStore` shape (JSON-per-row tables, a
//! dedicated connection per blocking call via `spawn_blocking`) but with
//! one table per entity instead of a single namespaced key/value table,
//! since the engine's read patterns (list by dataset, list by agent, list
//! by status) want real columns to filter on rather than a JSON-string
//! `LIKE` scan.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::StoreError;

mod agents;
mod annotations;
mod costs;
mod datasets;
mod judge_configs;
mod proposals;
mod runs;
mod system_prompts;
mod testcases;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS agents (
    agent_id TEXT PRIMARY KEY,
    json TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS prompt_versions (
    agent_id TEXT NOT NULL,
    version INTEGER NOT NULL,
    json TEXT NOT NULL,
    PRIMARY KEY (agent_id, version)
);
CREATE TABLE IF NOT EXISTS datasets (
    dataset_id TEXT PRIMARY KEY,
    json TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS testcases (
    tc_id TEXT PRIMARY KEY,
    dataset_id TEXT NOT NULL,
    json TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS judge_configs (
    judge_config_id TEXT NOT NULL,
    version INTEGER NOT NULL,
    json TEXT NOT NULL,
    PRIMARY KEY (judge_config_id, version)
);
CREATE TABLE IF NOT EXISTS runs (
    eval_id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL,
    dataset_id TEXT NOT NULL,
    status TEXT NOT NULL,
    json TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS run_annotations (
    evaluation_id TEXT NOT NULL,
    testcase_id TEXT NOT NULL,
    json TEXT NOT NULL,
    PRIMARY KEY (evaluation_id, testcase_id)
);
CREATE TABLE IF NOT EXISTS action_annotations (
    evaluation_id TEXT NOT NULL,
    testcase_id TEXT NOT NULL,
    action_index INTEGER NOT NULL,
    json TEXT NOT NULL,
    PRIMARY KEY (evaluation_id, testcase_id, action_index)
);
CREATE TABLE IF NOT EXISTS proposals (
    proposal_id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL,
    json TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS cost_records (
    cost_id TEXT PRIMARY KEY,
    agent_id TEXT,
    evaluation_id TEXT,
    json TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS system_prompts (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// All tables `reset_all_data` is permitted to truncate. A closed
/// whitelist so a future table addition does not silently become
/// wipeable by a careless admin call.
const RESETTABLE_TABLES: &[&str] = &[
    "agents",
    "prompt_versions",
    "datasets",
    "testcases",
    "judge_configs",
    "runs",
    "run_annotations",
    "action_annotations",
    "proposals",
    "cost_records",
    "system_prompts",
];

pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        let conn = Connection::open(&db_path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { db_path })
    }

    /// Runs a blocking rusqlite closure on the blocking thread pool, the
    /// way every teacher `SqliteStore`/`SqliteSaver` method does.
    pub(crate) async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            f(&conn)
        })
        .await?
    }

    /// Wipes every resettable table (spec §4.1 "admin reset"). Intended
    /// for test/demo environments only; callers above the store decide
    /// who is allowed to invoke it.
    pub async fn reset_all_data(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            for table in RESETTABLE_TABLES {
                conn.execute(&format!("DELETE FROM {table}"), [])?;
            }
            Ok(())
        })
        .await
    }
}

fn row_not_found(what: &str, id: &str) -> StoreError {
    StoreError::NotFound(format!("{what} '{id}' not found"))
}

pub(crate) use row_not_found as not_found;
