//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract used to persist portfolio snapshots.
//! - Isolate SQLite query details from services.

pub mod snapshot_repo;
