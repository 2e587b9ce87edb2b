use rusqlite::params;

use super::{not_found, SqliteStore};
use crate::error::StoreError;
use crate::model::PromptProposal;

impl SqliteStore {
    pub async fn put_proposal(&self, proposal: &PromptProposal) -> Result<(), StoreError> {
        let proposal = proposal.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&proposal)?;
            conn.execute(
                "INSERT OR REPLACE INTO proposals (proposal_id, agent_id, json) VALUES (?1, ?2, ?3)",
                params![proposal.proposal_id, proposal.agent_id, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_proposal(&self, proposal_id: &str) -> Result<PromptProposal, StoreError> {
        let proposal_id = proposal_id.to_string();
        self.with_conn(move |conn| {
            let json: String = conn
                .query_row("SELECT json FROM proposals WHERE proposal_id = ?1", params![proposal_id], |row| row.get(0))
                .map_err(|_| not_found("proposal", &proposal_id))?;
            Ok(serde_json::from_str(&json)?)
        })
        .await
    }

    pub async fn list_proposals_by_agent(&self, agent_id: &str) -> Result<Vec<PromptProposal>, StoreError> {
        let agent_id = agent_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT json FROM proposals WHERE agent_id = ?1 ORDER BY proposal_id",
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
