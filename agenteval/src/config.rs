//! Engine configuration, loaded from process environment variables.
//!
//! Mirrors the teacher's `config` crate precedence model (existing env
//! wins; unset keys fall back to defaults) and the key set from
//! `original_source/src/api/config.py`.

/// Resolved engine configuration (spec §6 "Environment / configuration keys").
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub judge_base_url: String,
    pub judge_api_key: String,
    pub judge_model: String,
    pub agent_endpoint_default: String,
    pub retry_max_attempts: u32,
    pub retry_base_delay_secs: f64,
    pub retry_max_delay_secs: f64,
    pub store_db_path: String,
    pub run_default_timeout_secs: u64,
    pub run_verbose_logging: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl EngineConfig {
    /// Loads configuration from the process environment.
    ///
    /// LLM API key resolution cascade (spec §6): explicit judge key wins,
    /// then an explicit agent-dispatch key, then a local no-auth
    /// placeholder — mirrors `config.py`'s
    /// `LLM_API_KEY = LLM_API_KEY or ANTHROPIC_API_KEY or "ollama"`.
    pub fn from_env() -> Self {
        let judge_api_key = std::env::var("JUDGE_API_KEY")
            .or_else(|_| std::env::var("AGENT_LLM_API_KEY"))
            .unwrap_or_else(|_| "local-no-auth".to_string());

        Self {
            judge_base_url: env_or("JUDGE_BASE_URL", "http://localhost:11434/v1"),
            judge_api_key,
            judge_model: env_or("JUDGE_MODEL", "qwen3-coder:latest"),
            agent_endpoint_default: env_or("AGENT_ENDPOINT_DEFAULT", "http://localhost:8001/invoke"),
            retry_max_attempts: env_parse("RETRY_MAX_ATTEMPTS", 5),
            retry_base_delay_secs: env_parse("RETRY_BASE_DELAY_SECS", 1.0),
            retry_max_delay_secs: env_parse("RETRY_MAX_DELAY_SECS", 30.0),
            store_db_path: env_or("STORE_DB_PATH", "data/agenteval.db"),
            run_default_timeout_secs: env_parse("RUN_DEFAULT_TIMEOUT_SECS", 300),
            run_verbose_logging: env_parse("RUN_VERBOSE_LOGGING", false),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_env_unset() {
        std::env::remove_var("RETRY_MAX_ATTEMPTS");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.retry_max_attempts, 5);
        assert_eq!(cfg.retry_base_delay_secs, 1.0);
    }

    #[test]
    fn judge_key_cascade_falls_back_to_agent_key() {
        std::env::remove_var("JUDGE_API_KEY");
        std::env::set_var("AGENT_LLM_API_KEY", "agent-key-123");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.judge_api_key, "agent-key-123");
        std::env::remove_var("AGENT_LLM_API_KEY");
    }
}
