//! Task dependency graph.
//!
//! # Responsibility
//! - Resolve direct prerequisites and completion readiness.
//! - Validate new dependency edges before the store records them.
//!
//! # Invariants
//! - Only direct dependencies are inspected; traversal never recurses, so
//!   cyclic graphs are tolerated and always terminate.
//! - Dangling dependency ids are skipped, not reported.

pub mod dependency;
