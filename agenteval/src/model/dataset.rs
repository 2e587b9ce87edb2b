//! Dataset identity (spec §3 "Dataset").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dataset owns the exact set of test cases whose `dataset_id` equals
/// its id (invariant enforced by the store's cascade-delete and by
/// [`crate::store::Store::list_testcases_by_dataset`] being the sole
/// read path used by [`crate::coordinator::RunCoordinator`]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub dataset_id: String,
    pub name: String,
    pub goal: String,
    pub synthetic_domain: String,
    pub risk_tier: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            dataset_id: crate::model::new_id("dataset"),
            name: name.into(),
            goal: goal.into(),
            synthetic_domain: String::new(),
            risk_tier: None,
            created_at: Utc::now(),
        }
    }
}
