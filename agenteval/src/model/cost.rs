//! Per-LLM-call cost telemetry (spec §3 "CostRecord").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    AgentInvocation,
    JudgeLlm,
    ProposalGeneration,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CostRecord {
    pub cost_id: String,
    pub evaluation_id: Option<String>,
    pub testcase_id: Option<String>,
    pub agent_id: Option<String>,
    pub call_type: CallType,
    pub model: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub cost_usd: f64,
    pub timestamp: DateTime<Utc>,
}

impl CostRecord {
    pub fn new(call_type: CallType, model: impl Into<String>) -> Self {
        Self {
            cost_id: crate::model::new_id("cost"),
            evaluation_id: None,
            testcase_id: None,
            agent_id: None,
            call_type,
            model: model.into(),
            tokens_in: 0,
            tokens_out: 0,
            cost_usd: 0.0,
            timestamp: Utc::now(),
        }
    }
}
