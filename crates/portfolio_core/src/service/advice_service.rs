//! Mitigation advice for blocked tasks.
//!
//! # Responsibility
//! - Hand blocked tasks to an external `AdviceProvider` off the caller's
//!   thread.
//! - Record each outcome in an in-memory cache keyed by task id.
//!
//! # Invariants
//! - Task state is never touched.
//! - Provider failure degrades to a fixed fallback text, never a hard error.
//! - Requests are not de-duplicated; the last terminal write wins, even if
//!   the blocker was resolved meanwhile.

use crate::model::task::Task;
use crate::model::TaskId;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Stored when the provider answers with empty text.
pub const ADVICE_EMPTY_FALLBACK: &str = "Advice unavailable.";
/// Stored when the provider fails.
pub const ADVICE_OFFLINE_FALLBACK: &str = "AI strategy engine offline.";

/// Advice request/provider errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdviceError {
    /// Task is not blocked or has a blank blocker reason.
    NotBlocked(TaskId),
    /// Provider could not produce suggestions.
    Unavailable(String),
}

impl Display for AdviceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotBlocked(id) => write!(f, "task {id} has no blocker reason to advise on"),
            Self::Unavailable(message) => write!(f, "advice unavailable: {message}"),
        }
    }
}

impl Error for AdviceError {}

/// Input handed to the advice provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    pub task_id: TaskId,
    pub task_title: String,
    pub blocker_reason: String,
}

impl AdviceRequest {
    /// Builds a request for a blocked task with a non-blank reason.
    pub fn for_task(task: &Task) -> Result<Self, AdviceError> {
        let reason = task
            .blocker_details()
            .map(|details| details.reason.trim())
            .filter(|reason| !reason.is_empty())
            .ok_or_else(|| AdviceError::NotBlocked(task.id.clone()))?;

        Ok(Self {
            task_id: task.id.clone(),
            task_title: task.title.clone(),
            blocker_reason: reason.to_string(),
        })
    }

    /// Standard prompt text for text-generation providers.
    pub fn prompt(&self) -> String {
        format!(
            "Project Context: A task titled \"{}\" is currently blocked. Reported Blocker: \"{}\". \
             As a Senior PM, suggest 3 highly practical mitigation steps to unblock this or reduce impact.",
            self.task_title, self.blocker_reason
        )
    }
}

/// External suggestion capability. May block; runs on the blocking pool.
pub trait AdviceProvider: Send + Sync + 'static {
    fn suggest(&self, request: &AdviceRequest) -> Result<String, AdviceError>;
}

/// Cached advice for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum AdviceEntry {
    /// A request is outstanding.
    Pending,
    /// Provider text.
    Ready(String),
    /// Fixed fallback text after an empty or failed answer.
    Fallback(String),
}

impl AdviceEntry {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Ready(text) | Self::Fallback(text) => Some(text.as_str()),
        }
    }
}

/// Shared advice cache keyed by task id.
#[derive(Debug, Clone, Default)]
pub struct AdviceCache {
    entries: Arc<Mutex<HashMap<TaskId, AdviceEntry>>>,
}

impl AdviceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_id: &str) -> Option<AdviceEntry> {
        self.lock().get(task_id).cloned()
    }

    pub fn is_pending(&self, task_id: &str) -> bool {
        matches!(self.lock().get(task_id), Some(AdviceEntry::Pending))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn insert(&self, task_id: TaskId, entry: AdviceEntry) {
        self.lock().insert(task_id, entry);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, AdviceEntry>> {
        // A panicking writer cannot leave a half-written entry behind.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs advice requests on a Tokio runtime and fills the cache.
pub struct AdviceService<P: AdviceProvider> {
    provider: Arc<P>,
    cache: AdviceCache,
    runtime: Handle,
}

impl<P: AdviceProvider> AdviceService<P> {
    pub fn new(provider: P, runtime: Handle) -> Self {
        Self {
            provider: Arc::new(provider),
            cache: AdviceCache::new(),
            runtime,
        }
    }

    pub fn cache(&self) -> &AdviceCache {
        &self.cache
    }

    /// Starts one advice request for `task`.
    ///
    /// Marks the task pending immediately; the returned handle resolves to
    /// the terminal entry that was written to the cache.
    ///
    /// # Errors
    /// - `NotBlocked` when `task` has no blocker reason; nothing is cached.
    pub fn request(&self, task: &Task) -> Result<JoinHandle<AdviceEntry>, AdviceError> {
        let request = AdviceRequest::for_task(task)?;
        self.cache.insert(request.task_id.clone(), AdviceEntry::Pending);
        info!(
            "event=advice_request module=advice status=start task_id={}",
            request.task_id
        );

        let provider = Arc::clone(&self.provider);
        let cache = self.cache.clone();
        Ok(self.runtime.spawn_blocking(move || {
            let entry = match provider.suggest(&request) {
                Ok(text) if !text.trim().is_empty() => AdviceEntry::Ready(text),
                Ok(_) => AdviceEntry::Fallback(ADVICE_EMPTY_FALLBACK.to_string()),
                Err(err) => {
                    warn!(
                        "event=advice_request module=advice status=error task_id={} error={}",
                        request.task_id, err
                    );
                    AdviceEntry::Fallback(ADVICE_OFFLINE_FALLBACK.to_string())
                }
            };
            cache.insert(request.task_id.clone(), entry.clone());
            info!(
                "event=advice_request module=advice status=ok task_id={} fallback={}",
                request.task_id,
                matches!(entry, AdviceEntry::Fallback(_))
            );
            entry
        }))
    }
}
