use rusqlite::params;

use super::{not_found, SqliteStore};
use crate::error::StoreError;
use crate::model::{EvaluationRun, RunStatus};

fn status_str(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Pending => "pending",
        RunStatus::Running => "running",
        RunStatus::Completed => "completed",
        RunStatus::Failed => "failed",
        RunStatus::Cancelled => "cancelled",
    }
}

impl SqliteStore {
    pub async fn put_run(&self, run: &EvaluationRun) -> Result<(), StoreError> {
        let run = run.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&run)?;
            conn.execute(
                "INSERT OR REPLACE INTO runs (eval_id, agent_id, dataset_id, status, json) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![run.eval_id, run.agent_id, run.dataset_id, status_str(run.status), json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_run(&self, eval_id: &str) -> Result<EvaluationRun, StoreError> {
        let eval_id = eval_id.to_string();
        self.with_conn(move |conn| {
            let json: String = conn
                .query_row("SELECT json FROM runs WHERE eval_id = ?1", params![eval_id], |row| row.get(0))
                .map_err(|_| not_found("run", &eval_id))?;
            Ok(serde_json::from_str(&json)?)
        })
        .await
    }

    pub async fn list_runs_by_agent(&self, agent_id: &str) -> Result<Vec<EvaluationRun>, StoreError> {
        let agent_id = agent_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT json FROM runs WHERE agent_id = ?1 ORDER BY eval_id",
            )?;
            let rows = stmt.query_map(params![agent_id], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(serde_json::from_str(&row?)?);
            }
            Ok(out)
        })
        .await
    }

    pub async fn list_runs_by_status(&self, status: RunStatus) -> Result<Vec<EvaluationRun>, StoreError> {
        let status = status_str(status).to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare("SELECT json FROM runs WHERE status = ?1 ORDER BY eval_id")?;
            let rows = stmt.query_map(params![status], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(serde_json::from_str(&row?)?);
            }
            Ok(out)
        })
        .await
    }

    /// The most recent completed run for `(agent_id, dataset_id)`, used by
    /// [`crate::coordinator::RunCoordinator`] to detect regressions
    /// (spec glossary "Regression").
    pub async fn last_completed_run(&self, agent_id: &str, dataset_id: &str) -> Result<Option<EvaluationRun>, StoreError> {
        let runs = self.list_runs_by_agent(agent_id).await?;
        Ok(runs
            .into_iter()
            .filter(|r| r.dataset_id == dataset_id && r.status == RunStatus::Completed)
            .max_by_key(|r| r.completed_at))
    }
}
