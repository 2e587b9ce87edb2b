//! Agent identity and prompt versions (spec §3 "Agent", "PromptVersion").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An agent under test: a stable identity plus the HTTP endpoint the
/// dispatcher calls (see [`crate::dispatcher`]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub agent_id: String,
    pub name: String,
    pub description: String,
    pub endpoint_url: String,
    pub model_label: String,
    pub team: Option<String>,
    pub tags: Vec<String>,
    pub default_risk_tier: Option<String>,
    /// Sampling rate in `[0, 1]`, used by production-trace ingestion
    /// (out of scope here; carried as a plain field so the data model
    /// round-trips through the store unchanged).
    pub sampling_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(name: impl Into<String>, endpoint_url: impl Into<String>, model_label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            agent_id: crate::model::new_id("agent"),
            name: name.into(),
            description: String::new(),
            endpoint_url: endpoint_url.into(),
            model_label: model_label.into(),
            team: None,
            tags: Vec::new(),
            default_risk_tier: None,
            sampling_rate: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One version of an agent's system prompt. `(agent_id, version)` is the
/// composite store key (spec §3, §4.1). At most one version per agent has
/// `is_active = true`; the [`crate::store::Store::set_active_prompt`]
/// operation is the only way to flip it, so readers never observe two (or
/// zero) active versions mid-transition.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PromptVersion {
    pub agent_id: String,
    pub version: u32,
    pub system_prompt: String,
    pub author_notes: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PromptVersion {
    pub fn new(agent_id: impl Into<String>, version: u32, system_prompt: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            version,
            system_prompt: system_prompt.into(),
            author_notes: String::new(),
            is_active: false,
            created_at: Utc::now(),
        }
    }
}
