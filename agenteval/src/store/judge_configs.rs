use rusqlite::params;

use super::{not_found, SqliteStore};
use crate::error::StoreError;
use crate::model::JudgeConfig;

impl SqliteStore {
    pub async fn put_judge_config(&self, config: &JudgeConfig) -> Result<(), StoreError> {
        let config = config.clone();
        self.with_conn(move |conn| {
            let json = serde_json::to_string(&config)?;
            conn.execute(
                "INSERT OR REPLACE INTO judge_configs (judge_config_id, version, json) VALUES (?1, ?2, ?3)",
                params![config.judge_config_id, config.version, json],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_judge_config(&self, id: &str, version: u32) -> Result<JudgeConfig, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let json: String = conn
                .query_row(
                    "SELECT json FROM judge_configs WHERE judge_config_id = ?1 AND version = ?2",
                    params![id, version],
                    |row| row.get(0),
                )
                .map_err(|_| not_found("judge_config", &format!("{id}@{version}")))?;
            Ok(serde_json::from_str(&json)?)
        })
        .await
    }

    pub async fn list_judge_config_versions(&self, id: &str) -> Result<Vec<JudgeConfig>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT json FROM judge_configs WHERE judge_config_id = ?1 ORDER BY version",
            )?;
            let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(serde_json::from_str(&row?)?);
            }
            Ok(out)
        })
        .await
    }

    /// Every distinct judge-config id currently stored, newest version
    /// first within each id — used by the reconciler to find which
    /// configs already exist before seeding defaults.
    pub async fn list_judge_config_ids(&self) -> Result<Vec<String>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT DISTINCT judge_config_id FROM judge_configs")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<Result<Vec<_>, rusqlite::Error>>()?)
        })
        .await
    }

    /// Exactly one judge config is globally active at a time (spec §3
    /// "JudgeConfig"); scans every id's versions rather than a dedicated
    /// column, since activations are rare compared to reads.
    pub async fn get_active_judge_config(&self) -> Result<Option<JudgeConfig>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT json FROM judge_configs")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            for row in rows {
                let cfg: JudgeConfig = serde_json::from_str(&row?)?;
                if cfg.is_active {
                    return Ok(Some(cfg));
                }
            }
            Ok(None)
        })
        .await
    }

    pub async fn next_judge_config_version(&self, id: &str) -> Result<u32, StoreError> {
        let versions = self.list_judge_config_versions(id).await?;
        Ok(versions.iter().map(|v| v.version).max().unwrap_or(0) + 1)
    }

    /// Atomically activates `(id, version)` globally: clears every
    /// config's `is_active` flag across every id, then sets the target.
    pub async fn set_active_judge_config(&self, id: &str, version: u32) -> Result<(), StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let exists: bool = tx
                .query_row(
                    "SELECT 1 FROM judge_configs WHERE judge_config_id = ?1 AND version = ?2",
                    params![id, version],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !exists {
                return Err(not_found("judge_config", &format!("{id}@{version}")));
            }
            let rows: Vec<(String, u32, String)> = {
                let mut stmt = tx.prepare("SELECT judge_config_id, version, json FROM judge_configs")?;
                let mapped = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
                mapped.collect::<Result<Vec<_>, rusqlite::Error>>()?
            };
            for (cfg_id, v, json) in rows {
                let mut cfg: JudgeConfig = serde_json::from_str(&json)?;
                cfg.is_active = cfg_id == id && v == version;
                let updated = serde_json::to_string(&cfg)?;
                tx.execute(
                    "UPDATE judge_configs SET json = ?1 WHERE judge_config_id = ?2 AND version = ?3",
                    params![updated, cfg_id, v],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
