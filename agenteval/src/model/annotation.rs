//! Human labels on completed results (spec §3 "RunAnnotation & ActionAnnotation").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Efficiency {
    Efficient,
    Acceptable,
    Wasteful,
}

/// Run-level human label on one `(evaluation_id, run_id)` test case.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunAnnotation {
    pub evaluation_id: String,
    pub testcase_id: String,
    pub outcome: u8,
    pub efficiency: Efficiency,
    pub issues: Vec<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Per-tool-call human label, keyed by `(evaluation_id, run_id, action_index)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActionAnnotation {
    pub evaluation_id: String,
    pub testcase_id: String,
    pub action_index: usize,
    pub correctness: u8,
    pub parameter_quality: u8,
    pub info_utilization: u8,
    pub error_contributor: bool,
    pub correction: Option<String>,
    pub created_at: DateTime<Utc>,
}
