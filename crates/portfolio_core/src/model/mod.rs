//! Portfolio domain model.
//!
//! # Responsibility
//! - Define canonical records for projects, tasks, risks and decisions.
//! - Keep the snapshot wire shape (camelCase, display-string enums) next to
//!   the types that own it.
//!
//! # Invariants
//! - Every entity is identified by a stable string id, never reused.
//! - Blocker metadata exists exactly when a task is blocked; the type of
//!   `TaskState` enforces it.
//! - Derived project fields are not part of `Project`; see
//!   `service::derivation`.

use uuid::Uuid;

pub mod decision;
pub mod project;
pub mod risk;
pub mod task;
pub mod validation;

/// Stable project identifier (`p1`, `p-…`).
pub type ProjectId = String;
/// Stable task identifier (`t1`, `t-…`).
pub type TaskId = String;
/// Stable risk identifier.
pub type RiskId = String;
/// Stable decision identifier.
pub type DecisionId = String;

/// Generates a fresh entity id of the form `<prefix>-<uuid simple>`.
pub fn new_entity_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
