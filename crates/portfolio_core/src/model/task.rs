//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its five-way lifecycle.
//! - Carry blocker metadata inside the `Blocked` state so presence is
//!   guaranteed by construction.
//!
//! # Invariants
//! - `dependencies` holds unique ids in insertion order.
//! - Leaving `Blocked` drops `BlockerDetails`; there is no other place to
//!   keep them.
//! - Wire decoding normalizes legacy shapes instead of rejecting them.

use crate::model::{ProjectId, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Fieldless task status label used by filters, gates and the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "At Risk")]
    AtRisk,
    Blocked,
    Done,
}

impl TaskStatus {
    /// Display label shared with the snapshot format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::AtRisk => "At Risk",
            Self::Blocked => "Blocked",
            Self::Done => "Done",
        }
    }

    /// Parses a display label, accepting snake/kebab spellings too.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "todo" => Some(Self::Todo),
            "in progress" => Some(Self::InProgress),
            "at risk" => Some(Self::AtRisk),
            "blocked" => Some(Self::Blocked),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured description of why a task is stalled.
///
/// All fields are required but may be empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerDetails {
    pub reason: String,
    pub owner: String,
    pub eta: String,
}

impl BlockerDetails {
    pub fn new(
        reason: impl Into<String>,
        owner: impl Into<String>,
        eta: impl Into<String>,
    ) -> Self {
        Self {
            reason: reason.into(),
            owner: owner.into(),
            eta: eta.into(),
        }
    }
}

/// Task lifecycle state. `Blocked` owns its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Todo,
    InProgress,
    AtRisk,
    Blocked(BlockerDetails),
    Done,
}

impl TaskState {
    /// Builds an unblocked state from a status label.
    ///
    /// Returns `None` for `TaskStatus::Blocked`, which needs details.
    pub fn unblocked(status: TaskStatus) -> Option<Self> {
        match status {
            TaskStatus::Todo => Some(Self::Todo),
            TaskStatus::InProgress => Some(Self::InProgress),
            TaskStatus::AtRisk => Some(Self::AtRisk),
            TaskStatus::Done => Some(Self::Done),
            TaskStatus::Blocked => None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Todo => TaskStatus::Todo,
            Self::InProgress => TaskStatus::InProgress,
            Self::AtRisk => TaskStatus::AtRisk,
            Self::Blocked(_) => TaskStatus::Blocked,
            Self::Done => TaskStatus::Done,
        }
    }

    pub fn blocker(&self) -> Option<&BlockerDetails> {
        match self {
            Self::Blocked(details) => Some(details),
            _ => None,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    /// Owning project. Tasks never move between projects.
    pub project_id: ProjectId,
    pub title: String,
    /// Free-form owner name; grouping is exact and case-sensitive.
    pub assignee: String,
    pub state: TaskState,
    pub due_date: NaiveDate,
    /// Direct prerequisites, unique, in insertion order.
    pub dependencies: Vec<TaskId>,
}

impl Task {
    /// Creates a `Todo` task without dependencies.
    pub fn new(
        id: impl Into<TaskId>,
        project_id: impl Into<ProjectId>,
        title: impl Into<String>,
        assignee: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            title: title.into(),
            assignee: assignee.into(),
            state: TaskState::Todo,
            due_date,
            dependencies: Vec::new(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.state.status()
    }

    pub fn is_done(&self) -> bool {
        self.status() == TaskStatus::Done
    }

    pub fn is_blocked(&self) -> bool {
        self.status() == TaskStatus::Blocked
    }

    pub fn blocker_details(&self) -> Option<&BlockerDetails> {
        self.state.blocker()
    }

    /// Overdue means due strictly before `today` and not done.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && !self.is_done()
    }

    pub fn depends_on(&self, task_id: &str) -> bool {
        self.dependencies.iter().any(|id| id == task_id)
    }
}

/// Flat snapshot shape: `status` plus optional `blockerDetails`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    project_id: ProjectId,
    title: String,
    #[serde(default)]
    assignee: String,
    status: TaskStatus,
    due_date: NaiveDate,
    #[serde(default)]
    dependencies: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blocker_details: Option<BlockerDetails>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let state = match TaskState::unblocked(record.status) {
            Some(state) => state,
            None => TaskState::Blocked(record.blocker_details.unwrap_or_default()),
        };

        let mut dependencies: Vec<TaskId> = Vec::with_capacity(record.dependencies.len());
        for dep_id in record.dependencies {
            if !dependencies.contains(&dep_id) {
                dependencies.push(dep_id);
            }
        }

        Self {
            id: record.id,
            project_id: record.project_id,
            title: record.title,
            assignee: record.assignee,
            state,
            due_date: record.due_date,
            dependencies,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let status = task.state.status();
        let blocker_details = match task.state {
            TaskState::Blocked(details) => Some(details),
            _ => None,
        };
        Self {
            id: task.id,
            project_id: task.project_id,
            title: task.title,
            assignee: task.assignee,
            status,
            due_date: task.due_date,
            dependencies: task.dependencies,
            blocker_details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockerDetails, Task, TaskState, TaskStatus};
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn status_labels_parse_loosely() {
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse(" At Risk "), Some(TaskStatus::AtRisk));
        assert_eq!(TaskStatus::parse("done"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse("archived"), None);
    }

    #[test]
    fn unblocked_state_refuses_blocked_label() {
        assert_eq!(TaskState::unblocked(TaskStatus::Blocked), None);
        assert_eq!(
            TaskState::unblocked(TaskStatus::AtRisk),
            Some(TaskState::AtRisk)
        );
    }

    #[test]
    fn overdue_ignores_done_tasks() {
        let mut task = Task::new("t1", "p1", "Inventory", "Alice", date("2024-05-05"));
        assert!(task.is_overdue(date("2024-05-06")));
        assert!(!task.is_overdue(date("2024-05-05")));

        task.state = TaskState::Done;
        assert!(!task.is_overdue(date("2024-05-06")));
    }

    #[test]
    fn wire_shape_uses_status_and_optional_blocker_details() {
        let mut task = Task::new("t3", "p1", "S3 Configuration", "Charlie", date("2024-05-20"));
        task.dependencies.push("t2".to_string());
        task.state = TaskState::Blocked(BlockerDetails::new("keys", "Infra", "2024-05-28"));

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["status"], "Blocked");
        assert_eq!(json["dueDate"], "2024-05-20");
        assert_eq!(json["blockerDetails"]["owner"], "Infra");

        task.state = TaskState::InProgress;
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "In Progress");
        assert!(json.get("blockerDetails").is_none());
    }

    #[test]
    fn decoding_normalizes_loose_blocker_shapes() {
        let blocked_without_details = serde_json::json!({
            "id": "t9",
            "projectId": "p1",
            "title": "Legacy",
            "assignee": "Dana",
            "status": "Blocked",
            "dueDate": "2024-06-01",
            "dependencies": ["t1", "t1", "t2"]
        });
        let task: Task = serde_json::from_value(blocked_without_details).unwrap();
        assert_eq!(task.blocker_details(), Some(&BlockerDetails::default()));
        assert_eq!(task.dependencies, vec!["t1".to_string(), "t2".to_string()]);

        let stale_details = serde_json::json!({
            "id": "t10",
            "projectId": "p1",
            "title": "Resolved",
            "assignee": "Dana",
            "status": "Todo",
            "dueDate": "2024-06-01",
            "dependencies": [],
            "blockerDetails": { "reason": "old", "owner": "x", "eta": "" }
        });
        let task: Task = serde_json::from_value(stale_details).unwrap();
        assert_eq!(task.state, TaskState::Todo);
    }
}
