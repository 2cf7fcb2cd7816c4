//! Risk register entries. Read-only inside the core.

use crate::model::{ProjectId, RiskId, TaskId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: RiskId,
    pub project_id: ProjectId,
    pub title: String,
    pub severity: RiskSeverity,
    #[serde(default)]
    pub impacted_task_ids: Vec<TaskId>,
    #[serde(default)]
    pub mitigation: String,
    /// Free-form register status (`Open`, `Mitigated`, ...).
    pub status: String,
}

impl Risk {
    pub fn is_open(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("open")
    }

    pub fn impacts_task(&self, task_id: &str) -> bool {
        self.impacted_task_ids.iter().any(|id| id == task_id)
    }
}
