//! Blocker lifecycle.
//!
//! # Responsibility
//! - Move tasks in and out of `Blocked` with structured metadata.
//! - Build the blocked-work listing consumed by the blocked view.
//!
//! # Invariants
//! - Entering `Blocked` through this module always attaches details.
//! - Clearing a blocker always resumes the task as `In Progress`.

use crate::model::project::Project;
use crate::model::task::{BlockerDetails, Task, TaskState};
use crate::model::{ProjectId, TaskId};
use chrono::NaiveDate;
use serde::Serialize;

/// Applies one blocker update in place.
///
/// - `Some(details)`: block, or overwrite details on an already blocked task.
/// - `None`: resume as `In Progress`, whatever the prior state.
pub fn apply_blocker(task: &mut Task, details: Option<BlockerDetails>) {
    task.state = match details {
        Some(details) => TaskState::Blocked(details),
        None => TaskState::InProgress,
    };
}

/// One row of the blocked-work listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTaskEntry {
    pub task_id: TaskId,
    pub title: String,
    pub assignee: String,
    pub project_id: ProjectId,
    /// `None` when the owning project is missing from the store.
    pub project_name: Option<String>,
    pub due_date: NaiveDate,
    pub blocker: BlockerDetails,
}

/// Lists blocked tasks in store order with their blocker details.
pub fn blocked_tasks(tasks: &[Task], projects: &[Project]) -> Vec<BlockedTaskEntry> {
    tasks
        .iter()
        .filter_map(|task| {
            let blocker = task.blocker_details()?;
            let project_name = projects
                .iter()
                .find(|project| project.id == task.project_id)
                .map(|project| project.name.clone());
            Some(BlockedTaskEntry {
                task_id: task.id.clone(),
                title: task.title.clone(),
                assignee: task.assignee.clone(),
                project_id: task.project_id.clone(),
                project_name,
                due_date: task.due_date,
                blocker: blocker.clone(),
            })
        })
        .collect()
}
