//! In-memory entity store.
//!
//! # Responsibility
//! - Own the canonical project/task/risk/decision collections.
//! - Serve as the single choke point for every mutation.
//! - Delegate completion gating to `graph::dependency` and blocker
//!   transitions to `service::blocker_service`.
//!
//! # Invariants
//! - Collections are never exposed mutably; reads hand out slices.
//! - A failed operation leaves every collection untouched.
//! - `version` increases by one after each successful mutation.
//! - Status changes never cascade to dependents.

use crate::graph::dependency::{unresolved_prerequisites, validate_dependency, DependencyError};
use crate::model::decision::{Decision, NewDecision};
use crate::model::project::{NewProject, Project};
use crate::model::risk::Risk;
use crate::model::task::{BlockerDetails, Task, TaskState, TaskStatus};
use crate::model::validation::{require_text, ValidationError};
use crate::model::{new_entity_id, DecisionId, ProjectId, TaskId};
use crate::service::blocker_service::apply_blocker;
use crate::service::derivation::{derive_project_view, ProjectView};
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// User-facing signal raised when a `Done` transition is refused.
///
/// Lists exactly the direct prerequisites that are not yet done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateSignal {
    pub task: Task,
    pub dependencies: Vec<Task>,
}

/// Errors from store mutations. None of them is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `Done` refused pending prerequisites; surface to the user.
    Gated(Box<GateSignal>),
    TaskNotFound(TaskId),
    ProjectNotFound(ProjectId),
    InvalidDependency(DependencyError),
    /// `Blocked` requested without metadata; use `set_blocker`.
    BlockerDetailsRequired(TaskId),
    Validation(ValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gated(signal) => {
                let ids: Vec<&str> = signal
                    .dependencies
                    .iter()
                    .map(|dep| dep.id.as_str())
                    .collect();
                write!(
                    f,
                    "task {} has unresolved prerequisites: {}",
                    signal.task.id,
                    ids.join(", ")
                )
            }
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::InvalidDependency(err) => write!(f, "invalid dependency: {err}"),
            Self::BlockerDetailsRequired(id) => {
                write!(f, "blocking task {id} requires blocker details")
            }
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDependency(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DependencyError> for StoreError {
    fn from(value: DependencyError) -> Self {
        Self::InvalidDependency(value)
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Snapshot data rejected on restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    DuplicateId {
        collection: &'static str,
        id: String,
    },
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId { collection, id } => {
                write!(f, "duplicate id `{id}` in {collection}")
            }
        }
    }
}

impl Error for IntegrityError {}

/// Plain-data copy of the full store, used for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub risks: Vec<Risk>,
    pub decisions: Vec<Decision>,
}

/// Creation input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub title: String,
    pub assignee: String,
    pub due_date: NaiveDate,
    pub state: TaskState,
    pub dependencies: Vec<TaskId>,
}

impl NewTask {
    /// `Todo` task without prerequisites.
    pub fn todo(
        project_id: impl Into<ProjectId>,
        title: impl Into<String>,
        assignee: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            title: title.into(),
            assignee: assignee.into(),
            due_date,
            state: TaskState::Todo,
            dependencies: Vec::new(),
        }
    }
}

/// Owned portfolio state with controlled mutation methods.
#[derive(Debug, Clone, Default)]
pub struct PortfolioStore {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    risks: Vec<Risk>,
    decisions: Vec<Decision>,
    version: u64,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a store from snapshot data.
    ///
    /// Dangling references (dependencies, impacted ids) are kept as-is.
    ///
    /// # Errors
    /// - `DuplicateId` when any collection repeats an id.
    pub fn from_snapshot(snapshot: PortfolioSnapshot) -> Result<Self, IntegrityError> {
        ensure_unique("projects", snapshot.projects.iter().map(|p| p.id.as_str()))?;
        ensure_unique("tasks", snapshot.tasks.iter().map(|t| t.id.as_str()))?;
        ensure_unique("risks", snapshot.risks.iter().map(|r| r.id.as_str()))?;
        ensure_unique("decisions", snapshot.decisions.iter().map(|d| d.id.as_str()))?;

        Ok(Self {
            projects: snapshot.projects,
            tasks: snapshot.tasks,
            risks: snapshot.risks,
            decisions: snapshot.decisions,
            version: 0,
        })
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            projects: self.projects.clone(),
            tasks: self.tasks.clone(),
            risks: self.risks.clone(),
            decisions: self.decisions.clone(),
        }
    }

    /// Mutation counter, usable as a cache key for derived views.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn risks(&self) -> &[Risk] {
        &self.risks
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn tasks_of_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a Task> {
        self.tasks
            .iter()
            .filter(move |task| task.project_id == project_id)
    }

    pub fn risks_for_project(&self, project_id: &str) -> Vec<&Risk> {
        self.risks
            .iter()
            .filter(|risk| risk.project_id == project_id)
            .collect()
    }

    pub fn risks_for_task(&self, task_id: &str) -> Vec<&Risk> {
        self.risks
            .iter()
            .filter(|risk| risk.impacts_task(task_id))
            .collect()
    }

    pub fn decisions_for_project(&self, project_id: &str) -> Vec<&Decision> {
        self.decisions
            .iter()
            .filter(|decision| decision.impacts_project(project_id))
            .collect()
    }

    pub fn decisions_for_task(&self, task_id: &str) -> Vec<&Decision> {
        self.decisions
            .iter()
            .filter(|decision| decision.impacts_task(task_id))
            .collect()
    }

    /// Derived view for one project, computed from current tasks.
    pub fn project_view(&self, project_id: &str) -> Option<ProjectView> {
        let project = self.project(project_id)?;
        Some(derive_project_view(project, self.tasks_of_project(project_id)))
    }

    /// Derived views for every project in insertion order.
    pub fn project_views(&self) -> Vec<ProjectView> {
        self.projects
            .iter()
            .map(|project| derive_project_view(project, self.tasks_of_project(&project.id)))
            .collect()
    }

    /// Adds a project with a fresh id.
    pub fn add_project(&mut self, input: NewProject) -> StoreResult<ProjectId> {
        let project = Project::create(input)?;
        let id = project.id.clone();
        self.projects.push(project);
        self.bump();
        info!("event=project_add module=store status=ok project_id={id}");
        Ok(id)
    }

    /// Adds a task with a fresh id.
    ///
    /// # Errors
    /// - `ProjectNotFound` when the owning project is missing.
    /// - `Validation` when the title is blank.
    /// - `InvalidDependency` when any listed prerequisite is rejected.
    /// - `Gated` when created as `Done` with prerequisites still open.
    pub fn add_task(&mut self, input: NewTask) -> StoreResult<TaskId> {
        if self.project(&input.project_id).is_none() {
            return Err(StoreError::ProjectNotFound(input.project_id));
        }
        let title = require_text(&input.title, "title")?;

        let mut task = Task::new(
            new_entity_id("t"),
            input.project_id,
            title,
            input.assignee,
            input.due_date,
        );
        task.state = input.state;
        for dep_id in input.dependencies {
            if task.depends_on(&dep_id) {
                continue;
            }
            validate_dependency(&task, &dep_id, &self.tasks)?;
            task.dependencies.push(dep_id);
        }
        if task.is_done() {
            let open = unresolved_prerequisites(&task, &self.tasks);
            if !open.is_empty() {
                info!(
                    "event=task_add module=store status=gated project_id={} unresolved_count={}",
                    task.project_id,
                    open.len()
                );
                let dependencies = open.into_iter().cloned().collect();
                return Err(StoreError::Gated(Box::new(GateSignal { task, dependencies })));
            }
        }

        let id = task.id.clone();
        info!(
            "event=task_add module=store status=ok task_id={} project_id={} dependency_count={}",
            id,
            task.project_id,
            task.dependencies.len()
        );
        self.tasks.push(task);
        self.bump();
        Ok(id)
    }

    /// Appends one entry to the decision log.
    pub fn add_decision(&mut self, input: NewDecision) -> StoreResult<DecisionId> {
        let decision = Decision::create(input)?;
        let id = decision.id.clone();
        self.decisions.push(decision);
        self.bump();
        info!("event=decision_log module=store status=ok decision_id={id}");
        Ok(id)
    }

    /// Changes task status through the completion gate.
    ///
    /// # Contract
    /// - `Done` is refused with `Gated` while any direct prerequisite is not
    ///   done; the task stays unchanged.
    /// - `Blocked` keeps existing details on an already blocked task and is
    ///   refused with `BlockerDetailsRequired` otherwise.
    /// - Leaving `Blocked` drops blocker details.
    pub fn set_task_status(&mut self, task_id: &str, new_status: TaskStatus) -> StoreResult<()> {
        let index = self.task_index(task_id)?;
        let task = &self.tasks[index];

        let next_state = match new_status {
            TaskStatus::Todo => TaskState::Todo,
            TaskStatus::InProgress => TaskState::InProgress,
            TaskStatus::AtRisk => TaskState::AtRisk,
            TaskStatus::Blocked => {
                if task.is_blocked() {
                    debug!("event=task_status module=store status=noop task_id={task_id} to=Blocked");
                    return Ok(());
                }
                warn!("event=task_status module=store status=error task_id={task_id} error_code=blocker_details_required");
                return Err(StoreError::BlockerDetailsRequired(task.id.clone()));
            }
            TaskStatus::Done => {
                let open = unresolved_prerequisites(task, &self.tasks);
                if !open.is_empty() {
                    info!(
                        "event=task_status module=store status=gated task_id={} unresolved_count={}",
                        task_id,
                        open.len()
                    );
                    return Err(StoreError::Gated(Box::new(GateSignal {
                        task: task.clone(),
                        dependencies: open.into_iter().cloned().collect(),
                    })));
                }
                TaskState::Done
            }
        };

        let from = task.status();
        self.tasks[index].state = next_state;
        self.bump();
        info!("event=task_status module=store status=ok task_id={task_id} from={from} to={new_status}");
        Ok(())
    }

    /// Attaches, edits or clears blocker details.
    ///
    /// `Some` blocks the task (or overwrites details in place); `None`
    /// resumes it as `In Progress`.
    pub fn set_blocker(
        &mut self,
        task_id: &str,
        details: Option<BlockerDetails>,
    ) -> StoreResult<()> {
        let index = self.task_index(task_id)?;
        let blocked = details.is_some();
        apply_blocker(&mut self.tasks[index], details);
        self.bump();
        info!("event=task_blocker module=store status=ok task_id={task_id} blocked={blocked}");
        Ok(())
    }

    /// Records `dep_id` as a direct prerequisite of `task_id`. Idempotent.
    pub fn add_dependency(&mut self, task_id: &str, dep_id: &str) -> StoreResult<()> {
        let index = self.task_index(task_id)?;
        let task = &self.tasks[index];
        if task.depends_on(dep_id) {
            debug!("event=dependency_add module=store status=noop task_id={task_id} dep_id={dep_id}");
            return Ok(());
        }
        if let Err(err) = validate_dependency(task, dep_id, &self.tasks) {
            warn!("event=dependency_add module=store status=error task_id={task_id} dep_id={dep_id} error={err}");
            return Err(err.into());
        }

        self.tasks[index].dependencies.push(dep_id.to_string());
        self.bump();
        info!("event=dependency_add module=store status=ok task_id={task_id} dep_id={dep_id}");
        Ok(())
    }

    /// Removes `dep_id` from `task_id` prerequisites when present.
    pub fn remove_dependency(&mut self, task_id: &str, dep_id: &str) -> StoreResult<()> {
        let index = self.task_index(task_id)?;
        let dependencies = &mut self.tasks[index].dependencies;
        let before = dependencies.len();
        dependencies.retain(|id| id != dep_id);
        if dependencies.len() == before {
            debug!("event=dependency_remove module=store status=noop task_id={task_id} dep_id={dep_id}");
            return Ok(());
        }

        self.bump();
        info!("event=dependency_remove module=store status=ok task_id={task_id} dep_id={dep_id}");
        Ok(())
    }

    fn task_index(&self, task_id: &str) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

fn ensure_unique<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), IntegrityError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(IntegrityError::DuplicateId {
                collection,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
