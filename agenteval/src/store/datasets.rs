use rusqlite::params;

use super::{not_found, SqliteStore};
use crate::error::StoreError;
use crate::model::Dataset;

impl SqliteStore {
    pub async fn put_dataset(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let dataset = dataset.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&dataset)?;
            conn.execute(
                "INSERT OR REPLACE INTO datasets (dataset_id, json) VALUES (?1, ?2)",
                params![dataset.dataset_id, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset, StoreError> {
        let dataset_id = dataset_id.to_string();
        self.with_conn(move |conn| {
            let json: String = conn
                .query_row("SELECT json FROM datasets WHERE dataset_id = ?1", params![dataset_id], |row| row.get(0))
                .map_err(|_| not_found("dataset", &dataset_id))?;
            Ok(serde_json::from_str(&json)?)
        })
        .await
    }

    pub async fn list_datasets(&self) -> Result<Vec<Dataset>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT json FROM datasets ORDER BY dataset_id")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(serde_json::from_str(&row?)?);
            }
            Ok(out)
        })
        .await
    }

    /// Cascade-deletes every test case owned by the dataset (spec §3
    /// "Dataset" invariant: a dataset owns the exact set of test cases
    /// whose `dataset_id` equals its id).
    pub async fn delete_dataset(&self, dataset_id: &str) -> Result<(), StoreError> {
        let dataset_id = dataset_id.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM testcases WHERE dataset_id = ?1", params![dataset_id])?;
            conn.execute("DELETE FROM datasets WHERE dataset_id = ?1", params![dataset_id])?;
            Ok(())
        })
        .await
    }
}
