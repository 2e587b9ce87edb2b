use rusqlite::params;

use super::{not_found, SqliteStore};
use crate::error::StoreError;
use crate::model::{Agent, PromptVersion};

impl SqliteStore {
    pub async fn put_agent(&self, agent: &Agent) -> Result<(), StoreError> {
        let agent = agent.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&agent)?;
            conn.execute(
                "INSERT OR REPLACE INTO agents (agent_id, json) VALUES (?1, ?2)",
                params![agent.agent_id, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent, StoreError> {
        let agent_id = agent_id.to_string();
        self.with_conn(move |conn| {
            let json: String = conn
                .query_row("SELECT json FROM agents WHERE agent_id = ?1", params![agent_id], |row| row.get(0))
                .map_err(|_| not_found("agent", &agent_id))?;
            Ok(serde_json::from_str(&json)?)
        })
        .await
    }

    pub async fn list_agents(&self) -> Result<Vec<Agent>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT json FROM agents ORDER BY agent_id")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut agents = Vec::new();
            for row in rows {
                agents.push(serde_json::from_str(&row?)?);
            }
            Ok(agents)
        })
        .await
    }

    /// Cascade-deletes every prompt version belonging to the agent, the
    /// way the store's dataset/testcase cascade does.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<(), StoreError> {
        let agent_id = agent_id.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM prompt_versions WHERE agent_id = ?1", params![agent_id])?;
            conn.execute("DELETE FROM agents WHERE agent_id = ?1", params![agent_id])?;
            Ok(())
        })
        .await
    }

    pub async fn put_prompt_version(&self, version: &PromptVersion) -> Result<(), StoreError> {
        let version = version.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&version)?;
            conn.execute(
                "INSERT OR REPLACE INTO prompt_versions (agent_id, version, json) VALUES (?1, ?2, ?3)",
                params![version.agent_id, version.version, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_prompt_version(&self, agent_id: &str, version: u32) -> Result<PromptVersion, StoreError> {
        let agent_id = agent_id.to_string();
        self.with_conn(move |conn| {
            let json: String = conn
                .query_row(
                    "SELECT json FROM prompt_versions WHERE agent_id = ?1 AND version = ?2",
                    params![agent_id, version],
                    |row| row.get(0),
                )
                .map_err(|_| not_found("prompt_version", &format!("{agent_id}@{version}")))?;
            Ok(serde_json::from_str(&json)?)
        })
        .await
    }

    pub async fn list_prompt_versions(&self, agent_id: &str) -> Result<Vec<PromptVersion>, StoreError> {
        let agent_id = agent_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT json FROM prompt_versions WHERE agent_id = ?1 ORDER BY version",
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

    pub async fn get_active_prompt_version(&self, agent_id: &str) -> Result<Option<PromptVersion>, StoreError> {
        let versions = self.list_prompt_versions(agent_id).await?;
        Ok(versions.into_iter().find(|v| v.is_active))
    }

    /// Next version number for a new prompt, one past the highest stored
    /// (spec §4.1 "next-version allocator"); `1` when the agent has none.
    pub async fn next_prompt_version(&self, agent_id: &str) -> Result<u32, StoreError> {
        let versions = self.list_prompt_versions(agent_id).await?;
        Ok(versions.iter().map(|v| v.version).max().unwrap_or(0) + 1)
    }

    /// Atomically activates exactly one version for the agent: clears
    /// every other version's `is_active` flag, then sets the target,
    /// inside a single transaction so readers never observe zero or two
    /// active versions for the same agent (spec §4.1 "atomic set-active").
    pub async fn set_active_prompt_version(&self, agent_id: &str, version: u32) -> Result<(), StoreError> {
        let agent_id = agent_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let exists: bool = tx
                .query_row(
                    "SELECT 1 FROM prompt_versions WHERE agent_id = ?1 AND version = ?2",
                    params![agent_id, version],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !exists {
                return Err(not_found("prompt_version", &format!("{agent_id}@{version}")));
            }
            let rows: Vec<(u32, String)> = {
                let mut stmt = tx.prepare("SELECT version, json FROM prompt_versions WHERE agent_id = ?1")?;
                let mapped = stmt.query_map(params![agent_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
                mapped.collect::<Result<Vec<_>, rusqlite::Error>>()?
            };
            for (v, json) in rows {
                let mut pv: PromptVersion = serde_json::from_str(&json)?;
                pv.is_active = v == version;
                let updated = serde_json::to_string(&pv)?;
                tx.execute(
                    "UPDATE prompt_versions SET json = ?1 WHERE agent_id = ?2 AND version = ?3",
                    params![updated, agent_id, v],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
