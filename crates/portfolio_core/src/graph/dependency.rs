//! Direct-prerequisite resolution and edge validation.

use crate::model::task::Task;
use crate::model::TaskId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    /// A task cannot depend on itself.
    SelfDependency(TaskId),
    /// Prerequisite id does not name an existing task.
    UnknownPrerequisite(TaskId),
    /// Prerequisite belongs to another project.
    CrossProject { task_id: TaskId, dep_id: TaskId },
}

impl Display for DependencyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfDependency(id) => write!(f, "task cannot depend on itself: {id}"),
            Self::UnknownPrerequisite(id) => write!(f, "prerequisite task not found: {id}"),
            Self::CrossProject { task_id, dep_id } => write!(
                f,
                "task {task_id} cannot depend on {dep_id} from another project"
            ),
        }
    }
}

impl Error for DependencyError {}

/// Returns direct prerequisites of `task` that are not `Done`.
///
/// Order follows `task.dependencies`. Ids missing from `all_tasks` are
/// skipped.
pub fn unresolved_prerequisites<'a>(task: &Task, all_tasks: &'a [Task]) -> Vec<&'a Task> {
    task.dependencies
        .iter()
        .filter_map(|dep_id| find_task(all_tasks, dep_id))
        .filter(|dep| !dep.is_done())
        .collect()
}

/// Whether `task` may transition to `Done` right now.
pub fn is_ready_to_complete(task: &Task, all_tasks: &[Task]) -> bool {
    unresolved_prerequisites(task, all_tasks).is_empty()
}

/// Tasks that list `task_id` as a direct prerequisite.
pub fn dependents_of<'a>(task_id: &str, all_tasks: &'a [Task]) -> Vec<&'a Task> {
    all_tasks
        .iter()
        .filter(|candidate| candidate.depends_on(task_id))
        .collect()
}

/// Checks that `dep_id` may be recorded as a prerequisite of `task`.
///
/// # Errors
/// - `SelfDependency` when `dep_id == task.id`.
/// - `UnknownPrerequisite` when no task has `dep_id`.
/// - `CrossProject` when the prerequisite lives in a different project.
pub fn validate_dependency(
    task: &Task,
    dep_id: &str,
    all_tasks: &[Task],
) -> Result<(), DependencyError> {
    if task.id == dep_id {
        return Err(DependencyError::SelfDependency(task.id.clone()));
    }
    let dep = find_task(all_tasks, dep_id)
        .ok_or_else(|| DependencyError::UnknownPrerequisite(dep_id.to_string()))?;
    if dep.project_id != task.project_id {
        return Err(DependencyError::CrossProject {
            task_id: task.id.clone(),
            dep_id: dep_id.to_string(),
        });
    }
    Ok(())
}

fn find_task<'a>(all_tasks: &'a [Task], task_id: &str) -> Option<&'a Task> {
    all_tasks.iter().find(|task| task.id == task_id)
}

#[cfg(test)]
mod tests {
    use super::{
        dependents_of, is_ready_to_complete, unresolved_prerequisites, validate_dependency,
        DependencyError,
    };
    use crate::model::task::{Task, TaskState};
    use chrono::NaiveDate;

    fn task(id: &str, project: &str, state: TaskState, deps: &[&str]) -> Task {
        let mut task = Task::new(
            id,
            project,
            format!("task {id}"),
            "Alice",
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        );
        task.state = state;
        task.dependencies = deps.iter().map(|dep| dep.to_string()).collect();
        task
    }

    #[test]
    fn unresolved_skips_done_and_dangling_ids() {
        let tasks = vec![
            task("t1", "p1", TaskState::Done, &[]),
            task("t2", "p1", TaskState::InProgress, &["t1"]),
            task("t3", "p1", TaskState::Todo, &["missing", "t2", "t1"]),
        ];

        let open: Vec<&str> = unresolved_prerequisites(&tasks[2], &tasks)
            .into_iter()
            .map(|dep| dep.id.as_str())
            .collect();
        assert_eq!(open, vec!["t2"]);
        assert!(is_ready_to_complete(&tasks[1], &tasks));
        assert!(!is_ready_to_complete(&tasks[2], &tasks));
    }

    #[test]
    fn cycles_resolve_without_recursion() {
        let tasks = vec![
            task("a", "p1", TaskState::Todo, &["b"]),
            task("b", "p1", TaskState::Todo, &["a"]),
        ];
        assert_eq!(unresolved_prerequisites(&tasks[0], &tasks).len(), 1);
        assert_eq!(unresolved_prerequisites(&tasks[1], &tasks).len(), 1);
    }

    #[test]
    fn dependents_lists_direct_dependents_only() {
        let tasks = vec![
            task("t1", "p1", TaskState::Done, &[]),
            task("t2", "p1", TaskState::Todo, &["t1"]),
            task("t3", "p1", TaskState::Todo, &["t2"]),
        ];
        let ids: Vec<&str> = dependents_of("t1", &tasks)
            .into_iter()
            .map(|dep| dep.id.as_str())
            .collect();
        assert_eq!(ids, vec!["t2"]);
    }

    #[test]
    fn validate_rejects_self_unknown_and_cross_project_edges() {
        let tasks = vec![
            task("t1", "p1", TaskState::Todo, &[]),
            task("t2", "p1", TaskState::Todo, &[]),
            task("t9", "p2", TaskState::Todo, &[]),
        ];

        assert_eq!(
            validate_dependency(&tasks[0], "t1", &tasks),
            Err(DependencyError::SelfDependency("t1".to_string()))
        );
        assert_eq!(
            validate_dependency(&tasks[0], "nope", &tasks),
            Err(DependencyError::UnknownPrerequisite("nope".to_string()))
        );
        assert!(matches!(
            validate_dependency(&tasks[0], "t9", &tasks),
            Err(DependencyError::CrossProject { .. })
        ));
        assert_eq!(validate_dependency(&tasks[0], "t2", &tasks), Ok(()));
    }
}
