//! Candidate prompt edits produced by [`crate::proposal::ProposalGenerator`]
//! (spec §3 "PromptProposal").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProposalCategory {
    Capability,
    Quality,
    Guardrails,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Applied,
    Dismissed,
}

/// Line-level diff against the referenced prompt version's text.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PromptProposal {
    pub proposal_id: String,
    pub agent_id: String,
    pub prompt_version: u32,
    pub title: String,
    pub category: ProposalCategory,
    pub confidence: f64,
    pub priority: Priority,
    pub pattern_source: String,
    pub expected_impact: String,
    pub diff: PromptDiff,
    pub status: ProposalStatus,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
}
