use rusqlite::params;

use super::SqliteStore;
use crate::error::StoreError;
use crate::model::CostRecord;

impl SqliteStore {
    pub async fn put_cost_record(&self, record: &CostRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&record)?;
            conn.execute(
                "INSERT OR REPLACE INTO cost_records (cost_id, agent_id, evaluation_id, json) VALUES (?1, ?2, ?3, ?4)",
                params![record.cost_id, record.agent_id, record.evaluation_id, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_cost_records_by_evaluation(&self, evaluation_id: &str) -> Result<Vec<CostRecord>, StoreError> {
        let evaluation_id = evaluation_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT json FROM cost_records WHERE evaluation_id = ?1 ORDER BY cost_id",
            )?;
            let rows = stmt.query_map(params![evaluation_id], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(serde_json::from_str(&row?)?);
            }
            Ok(out)
        })
        .await
    }

    pub async fn list_cost_records_by_agent(&self, agent_id: &str) -> Result<Vec<CostRecord>, StoreError> {
        let agent_id = agent_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT json FROM cost_records WHERE agent_id = ?1 ORDER BY cost_id",
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
}
