//! Read-side task and project listings.
//!
//! # Invariants
//! - Text search is a case-insensitive substring match.
//! - Task listings are sorted by due date ascending; ties keep store order.

use crate::model::project::Project;
use crate::model::task::Task;
use crate::model::ProjectId;
use chrono::NaiveDate;

/// Named task list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskPerspective {
    #[default]
    All,
    /// Not done.
    Active,
    Blocked,
    /// Due before today and not done.
    Overdue,
}

impl TaskPerspective {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "blocked" => Some(Self::Blocked),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }

    fn admits(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.is_done(),
            Self::Blocked => task.is_blocked(),
            Self::Overdue => task.is_overdue(today),
        }
    }
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    /// Matched against title and assignee.
    pub search: Option<String>,
    pub perspective: TaskPerspective,
    pub project_id: Option<ProjectId>,
}

/// Filters and sorts tasks for the task list.
pub fn list_tasks<'a>(tasks: &'a [Task], query: &TaskListQuery, today: NaiveDate) -> Vec<&'a Task> {
    let needle = query
        .search
        .as_deref()
        .map(|text| text.trim().to_lowercase())
        .unwrap_or_default();

    let mut result: Vec<&Task> = tasks
        .iter()
        .filter(|task| {
            needle.is_empty()
                || task.title.to_lowercase().contains(&needle)
                || task.assignee.to_lowercase().contains(&needle)
        })
        .filter(|task| query.perspective.admits(task, today))
        .filter(|task| {
            query
                .project_id
                .as_deref()
                .map_or(true, |project_id| task.project_id == project_id)
        })
        .collect();
    result.sort_by_key(|task| task.due_date);
    result
}

/// Tasks due today or earlier that are not done, by due date.
pub fn due_today(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let mut result: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.due_date <= today && !task.is_done())
        .collect();
    result.sort_by_key(|task| task.due_date);
    result
}

/// Projects whose name or description contains `text`.
pub fn search_projects<'a>(projects: &'a [Project], text: &str) -> Vec<&'a Project> {
    let needle = text.trim().to_lowercase();
    projects
        .iter()
        .filter(|project| project.matches_text(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::TaskPerspective;

    #[test]
    fn perspective_parse_is_case_insensitive() {
        assert_eq!(TaskPerspective::parse("Overdue"), Some(TaskPerspective::Overdue));
        assert_eq!(TaskPerspective::parse(" active "), Some(TaskPerspective::Active));
        assert_eq!(TaskPerspective::parse("later"), None);
    }
}
