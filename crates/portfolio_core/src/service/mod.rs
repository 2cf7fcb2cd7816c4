//! Core use-case services.
//!
//! # Responsibility
//! - Own and mutate the portfolio store behind one choke point.
//! - Provide pure read-side derivations for presentation callers.
//! - Keep storage and advice collaborators behind traits.

pub mod advice_service;
pub mod blocker_service;
pub mod derivation;
pub mod persistence_service;
pub mod portfolio_store;
pub mod task_query;
pub mod workload;
