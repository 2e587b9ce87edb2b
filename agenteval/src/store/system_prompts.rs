use rusqlite::params;

use super::SqliteStore;
use crate::error::StoreError;

impl SqliteStore {
    pub async fn get_system_prompt(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let value: Option<String> = conn
                .query_row("SELECT value FROM system_prompts WHERE key = ?1", params![key], |row| row.get(0))
                .ok();
            Ok(value)
        })
        .await
    }

    pub async fn put_system_prompt(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO system_prompts (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    /// Seeds `key` with `value` only if absent — used by the reconciler
    /// so re-runs never clobber an operator's edited prompt text.
    pub async fn seed_system_prompt_if_absent(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.get_system_prompt(key).await?.is_none() {
            self.put_system_prompt(key, value).await?;
        }
        Ok(())
    }
}
