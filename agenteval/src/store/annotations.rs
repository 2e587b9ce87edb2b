use rusqlite::params;

use super::SqliteStore;
use crate::error::StoreError;
use crate::model::{ActionAnnotation, RunAnnotation};

impl SqliteStore {
    pub async fn put_run_annotation(&self, annotation: &RunAnnotation) -> Result<(), StoreError> {
        let annotation = annotation.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&annotation)?;
            conn.execute(
                "INSERT OR REPLACE INTO run_annotations (evaluation_id, testcase_id, json) VALUES (?1, ?2, ?3)",
                params![annotation.evaluation_id, annotation.testcase_id, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_run_annotation(&self, evaluation_id: &str, testcase_id: &str) -> Result<Option<RunAnnotation>, StoreError> {
        let evaluation_id = evaluation_id.to_string();
        let testcase_id = testcase_id.to_string();
        self.with_conn(move |conn| {
            let json: Option<String> = conn
                .query_row(
                    "SELECT json FROM run_annotations WHERE evaluation_id = ?1 AND testcase_id = ?2",
                    params![evaluation_id, testcase_id],
                    |row| row.get(0),
                )
                .ok();
            Ok(json.map(|j| serde_json::from_str(&j)).transpose()?)
        })
        .await
    }

    /// Every run annotation for runs belonging to `eval_ids` — the join
    /// [`crate::proposal::ProposalGenerator`] needs to gather an agent's
    /// annotation history across its completed runs.
    pub async fn list_run_annotations_for_evals(&self, eval_ids: &[String]) -> Result<Vec<RunAnnotation>, StoreError> {
        let eval_ids = eval_ids.to_vec();
        self.with_conn(move |conn| {
            let mut out = Vec::new();
            let mut stmt = conn.prepare("SELECT json FROM run_annotations WHERE evaluation_id = ?1")?;
            for eval_id in &eval_ids {
                let rows = stmt.query_map(params![eval_id], |row| row.get::<_, String>(0))?;
                for row in rows {
                    out.push(serde_json::from_str(&row?)?);
                }
            }
            Ok(out)
        })
        .await
    }

    pub async fn put_action_annotation(&self, annotation: &ActionAnnotation) -> Result<(), StoreError> {
        let annotation = annotation.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&annotation)?;
            conn.execute(
                "INSERT OR REPLACE INTO action_annotations (evaluation_id, testcase_id, action_index, json) VALUES (?1, ?2, ?3, ?4)",
                params![annotation.evaluation_id, annotation.testcase_id, annotation.action_index as i64, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_action_annotations(&self, evaluation_id: &str, testcase_id: &str) -> Result<Vec<ActionAnnotation>, StoreError> {
        let evaluation_id = evaluation_id.to_string();
        let testcase_id = testcase_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT json FROM action_annotations WHERE evaluation_id = ?1 AND testcase_id = ?2 ORDER BY action_index",
            )?;
            let rows = stmt.query_map(params![evaluation_id, testcase_id], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(serde_json::from_str(&row?)?);
            }
            Ok(out)
        })
        .await
    }
}
