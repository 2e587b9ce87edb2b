use rusqlite::params;

use super::{not_found, SqliteStore};
use crate::error::StoreError;
use crate::model::TestCase;

impl SqliteStore {
    pub async fn put_testcase(&self, testcase: &TestCase) -> Result<(), StoreError> {
        let testcase = testcase.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&testcase)?;
            conn.execute(
                "INSERT OR REPLACE INTO testcases (tc_id, dataset_id, json) VALUES (?1, ?2, ?3)",
                params![testcase.tc_id, testcase.dataset_id, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_testcase(&self, tc_id: &str) -> Result<TestCase, StoreError> {
        let tc_id = tc_id.to_string();
        self.with_conn(move |conn| {
            let json: String = conn
                .query_row("SELECT json FROM testcases WHERE tc_id = ?1", params![tc_id], |row| row.get(0))
                .map_err(|_| not_found("testcase", &tc_id))?;
            Ok(serde_json::from_str(&json)?)
        })
        .await
    }

    /// The sole read path [`crate::coordinator::RunCoordinator`] uses to
    /// assemble a run (spec §3 "Dataset" doc comment).
    pub async fn list_testcases_by_dataset(&self, dataset_id: &str) -> Result<Vec<TestCase>, StoreError> {
        let dataset_id = dataset_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT json FROM testcases WHERE dataset_id = ?1 ORDER BY tc_id",
            )?;
            let rows = stmt.query_map(params![dataset_id], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(serde_json::from_str(&row?)?);
            }
            Ok(out)
        })
        .await
    }

    pub async fn delete_testcase(&self, tc_id: &str) -> Result<(), StoreError> {
        let tc_id = tc_id.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM testcases WHERE tc_id = ?1", params![tc_id])?;
            Ok(())
        })
        .await
    }
}
