//! Judge configuration: scoring mode, rubric, and prompt templates
//! (spec §3 "JudgeConfig", §4.3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    Binary,
    Rubric,
}

/// One level (1-5) of a rubric criterion's descriptor.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RubricLevel {
    pub score: u8,
    pub description: String,
}

/// One rubric criterion: a name, a description, and five level descriptors.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RubricCriterion {
    pub name: String,
    pub description: String,
    pub levels: Vec<RubricLevel>,
}

/// `(id, version)` keyed judge configuration. Exactly one version is
/// globally active at a time, flipped atomically by
/// [`crate::store::Store::set_active_judge_config`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JudgeConfig {
    pub judge_config_id: String,
    pub version: u32,
    pub name: String,
    pub is_active: bool,
    pub scoring_mode: ScoringMode,
    /// Average pass threshold for rubric mode (default 3.5 per spec;
    /// unused in binary mode).
    pub pass_threshold: Option<f64>,
    pub rubric: Vec<RubricCriterion>,
    pub system_prompt: String,
    pub user_prompt_template_single: String,
    pub user_prompt_template_batched: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl JudgeConfig {
    pub fn binary(id: impl Into<String>, version: u32, system_prompt: impl Into<String>) -> Self {
        Self {
            judge_config_id: id.into(),
            version,
            name: "Judge".to_string(),
            is_active: false,
            scoring_mode: ScoringMode::Binary,
            pass_threshold: None,
            rubric: Vec::new(),
            system_prompt: system_prompt.into(),
            user_prompt_template_single: String::new(),
            user_prompt_template_batched: String::new(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }
}
