//! Decision log entries.
//!
//! # Invariants
//! - The log is append-only: entries are created once and never edited.
//! - Impacted id lists are unique.

use crate::model::validation::{require_text, ValidationError};
use crate::model::{new_entity_id, DecisionId, ProjectId, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: DecisionId,
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub impacted_project_ids: Vec<ProjectId>,
    #[serde(default)]
    pub impacted_task_ids: Vec<TaskId>,
}

/// Creation input for one log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDecision {
    pub description: String,
    pub date: NaiveDate,
    pub impacted_project_ids: Vec<ProjectId>,
    pub impacted_task_ids: Vec<TaskId>,
}

impl Decision {
    /// Builds a decision with a fresh id.
    ///
    /// # Errors
    /// - `BlankField("description")` when the description is blank.
    pub fn create(input: NewDecision) -> Result<Self, ValidationError> {
        let description = require_text(&input.description, "description")?;
        Ok(Self {
            id: new_entity_id("d"),
            description,
            date: input.date,
            impacted_project_ids: unique(input.impacted_project_ids),
            impacted_task_ids: unique(input.impacted_task_ids),
        })
    }

    pub fn impacts_project(&self, project_id: &str) -> bool {
        self.impacted_project_ids.iter().any(|id| id == project_id)
    }

    pub fn impacts_task(&self, task_id: &str) -> bool {
        self.impacted_task_ids.iter().any(|id| id == task_id)
    }
}

fn unique(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
