//! Computation core for the project portfolio dashboard.
//! Owns the entity store, completion gating, blocker lifecycle and every
//! derived project/workload figure; presentation layers only read from it.

pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use graph::dependency::{
    dependents_of, is_ready_to_complete, unresolved_prerequisites, validate_dependency,
    DependencyError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::decision::{Decision, NewDecision};
pub use model::project::{NewProject, Project};
pub use model::risk::{Risk, RiskSeverity};
pub use model::task::{BlockerDetails, Task, TaskState, TaskStatus};
pub use model::validation::ValidationError;
pub use model::{DecisionId, ProjectId, RiskId, TaskId};
pub use repo::snapshot_repo::{RepoError, RepoResult, SnapshotRepository, SqliteSnapshotRepository};
pub use seed::{seed_snapshot, seed_store};
pub use service::advice_service::{
    AdviceCache, AdviceEntry, AdviceError, AdviceProvider, AdviceRequest, AdviceService,
};
pub use service::blocker_service::{blocked_tasks, BlockedTaskEntry};
pub use service::derivation::{
    derive_project_view, portfolio_summary, project_health, PortfolioSummary, ProjectHealth,
    ProjectStatus, ProjectView,
};
pub use service::persistence_service::{
    LoadedPortfolio, PersistenceError, PersistenceService, SnapshotKeys, SnapshotSource,
};
pub use service::portfolio_store::{
    GateSignal, IntegrityError, NewTask, PortfolioSnapshot, PortfolioStore, StoreError,
    StoreResult,
};
pub use service::task_query::{due_today, list_tasks, search_projects, TaskListQuery, TaskPerspective};
pub use service::workload::{workload_by_assignee, AssigneeWorkload, LoadLevel};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
