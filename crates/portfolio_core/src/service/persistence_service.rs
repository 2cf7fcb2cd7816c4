//! Snapshot save/restore use-cases.
//!
//! # Responsibility
//! - Encode the store into one JSON entry per collection.
//! - Restore the store, falling back to the seed dataset on absent or
//!   corrupt data.
//! - Reset persisted state to the seed dataset.
//!
//! # Invariants
//! - Corrupt snapshot content never surfaces as an error; storage failures
//!   do.
//! - A restore is all-or-nothing: collections are never mixed between the
//!   persisted snapshot and the seed.

use crate::repo::snapshot_repo::{RepoError, SnapshotRepository};
use crate::seed::seed_store;
use crate::service::portfolio_store::{PortfolioSnapshot, PortfolioStore};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default key namespace for snapshot entries.
pub const DEFAULT_SNAPSHOT_NAMESPACE: &str = "pm_command_center_v5";

/// Errors from persistence use-cases.
#[derive(Debug)]
pub enum PersistenceError {
    Repo(RepoError),
    Encode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<RepoError> for PersistenceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Where a loaded store came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Every collection was restored from storage.
    Restored,
    /// Nothing was stored yet.
    SeedEmpty,
    /// Stored data was incomplete or unreadable; the message says why.
    SeedFallback(String),
}

/// Store plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedPortfolio {
    pub store: PortfolioStore,
    pub source: SnapshotSource,
}

/// Storage keys for the four collections under one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotKeys {
    pub projects: String,
    pub tasks: String,
    pub risks: String,
    pub decisions: String,
}

impl SnapshotKeys {
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            projects: format!("{namespace}_projects"),
            tasks: format!("{namespace}_tasks"),
            risks: format!("{namespace}_risks"),
            decisions: format!("{namespace}_decisions"),
        }
    }

    fn all(&self) -> [&str; 4] {
        [
            self.projects.as_str(),
            self.tasks.as_str(),
            self.risks.as_str(),
            self.decisions.as_str(),
        ]
    }
}

/// Persistence facade over a snapshot repository.
pub struct PersistenceService<R: SnapshotRepository> {
    repo: R,
    keys: SnapshotKeys,
}

impl<R: SnapshotRepository> PersistenceService<R> {
    /// Uses `DEFAULT_SNAPSHOT_NAMESPACE`.
    pub fn new(repo: R) -> Self {
        Self::with_namespace(repo, DEFAULT_SNAPSHOT_NAMESPACE)
    }

    pub fn with_namespace(repo: R, namespace: &str) -> Self {
        Self {
            repo,
            keys: SnapshotKeys::for_namespace(namespace),
        }
    }

    pub fn keys(&self) -> &SnapshotKeys {
        &self.keys
    }

    /// Restores the store, or returns the seed dataset.
    ///
    /// # Errors
    /// - Storage failures only; bad content falls back to the seed.
    pub fn load_or_seed(&self) -> Result<LoadedPortfolio, PersistenceError> {
        let mut raw: Vec<Option<String>> = Vec::with_capacity(4);
        for key in self.keys.all() {
            raw.push(self.repo.load_entry(key)?);
        }

        if raw.iter().all(Option::is_none) {
            info!("event=snapshot_load module=persistence status=ok source=seed_empty");
            return Ok(LoadedPortfolio {
                store: seed_store(),
                source: SnapshotSource::SeedEmpty,
            });
        }

        match decode_snapshot(&self.keys, &raw) {
            Ok(store) => {
                info!(
                    "event=snapshot_load module=persistence status=ok source=restored projects={} tasks={}",
                    store.projects().len(),
                    store.tasks().len()
                );
                Ok(LoadedPortfolio {
                    store,
                    source: SnapshotSource::Restored,
                })
            }
            Err(reason) => {
                warn!(
                    "event=snapshot_load module=persistence status=fallback source=seed reason={}",
                    reason
                );
                Ok(LoadedPortfolio {
                    store: seed_store(),
                    source: SnapshotSource::SeedFallback(reason),
                })
            }
        }
    }

    /// Writes every collection of `store` in one transaction.
    pub fn save(&self, store: &PortfolioStore) -> Result<(), PersistenceError> {
        let entries = vec![
            (self.keys.projects.clone(), serde_json::to_string(store.projects())?),
            (self.keys.tasks.clone(), serde_json::to_string(store.tasks())?),
            (self.keys.risks.clone(), serde_json::to_string(store.risks())?),
            (self.keys.decisions.clone(), serde_json::to_string(store.decisions())?),
        ];
        self.repo.save_entries(&entries)?;
        info!(
            "event=snapshot_save module=persistence status=ok version={}",
            store.version()
        );
        Ok(())
    }

    /// Clears this namespace and reinstates the seed dataset in it.
    ///
    /// Entries under other namespaces are left untouched.
    pub fn reset(&self) -> Result<PortfolioStore, PersistenceError> {
        self.repo.remove_entries(&self.keys.all())?;
        let store = seed_store();
        self.save(&store)?;
        info!("event=snapshot_reset module=persistence status=ok");
        Ok(store)
    }
}

fn decode_snapshot(keys: &SnapshotKeys, raw: &[Option<String>]) -> Result<PortfolioStore, String> {
    let snapshot = PortfolioSnapshot {
        projects: decode_entry(&keys.projects, &raw[0])?,
        tasks: decode_entry(&keys.tasks, &raw[1])?,
        risks: decode_entry(&keys.risks, &raw[2])?,
        decisions: decode_entry(&keys.decisions, &raw[3])?,
    };
    PortfolioStore::from_snapshot(snapshot).map_err(|err| err.to_string())
}

fn decode_entry<T: DeserializeOwned>(key: &str, value: &Option<String>) -> Result<T, String> {
    let text = value
        .as_deref()
        .ok_or_else(|| format!("missing entry `{key}`"))?;
    serde_json::from_str(text).map_err(|err| format!("corrupt entry `{key}`: {err}"))
}
