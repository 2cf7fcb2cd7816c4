//! Per-assignee workload reducer.
//!
//! # Invariants
//! - Grouping uses the exact assignee string (case-sensitive).
//! - Output is sorted by `active` descending; ties keep first-seen order.
//! - Load thresholds are fixed.

use crate::model::task::Task;
use crate::service::derivation::percent_half_up;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// `active` at or above this count is overloaded.
pub const OVERLOADED_ACTIVE_THRESHOLD: usize = 10;
/// `active` below this count is healthy.
pub const HEALTHY_ACTIVE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadLevel {
    Overloaded,
    Nominal,
    Healthy,
}

impl LoadLevel {
    pub fn classify(active: usize) -> Self {
        if active >= OVERLOADED_ACTIVE_THRESHOLD {
            Self::Overloaded
        } else if active < HEALTHY_ACTIVE_LIMIT {
            Self::Healthy
        } else {
            Self::Nominal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeWorkload {
    pub assignee: String,
    pub total: usize,
    /// Tasks not done.
    pub active: usize,
    pub blocked: usize,
    pub overdue: usize,
    pub load: LoadLevel,
    /// `active` as a share of the overload threshold, capped at 100.
    pub capacity: u8,
    /// Done share of all tasks, rounded half-up; 0 without tasks.
    pub success_rate: u8,
}

fn capacity_percent(active: usize) -> u8 {
    let percent = (active * 100 / OVERLOADED_ACTIVE_THRESHOLD).min(100);
    u8::try_from(percent).unwrap_or(100)
}

/// Groups `tasks` by assignee and classifies each group's load.
pub fn workload_by_assignee(tasks: &[Task], today: NaiveDate) -> Vec<AssigneeWorkload> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<AssigneeWorkload> = Vec::new();

    for task in tasks {
        let slot = *slots.entry(task.assignee.as_str()).or_insert_with(|| {
            rows.push(AssigneeWorkload {
                assignee: task.assignee.clone(),
                total: 0,
                active: 0,
                blocked: 0,
                overdue: 0,
                load: LoadLevel::Healthy,
                capacity: 0,
                success_rate: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[slot];
        row.total += 1;
        if !task.is_done() {
            row.active += 1;
        }
        if task.is_blocked() {
            row.blocked += 1;
        }
        if task.is_overdue(today) {
            row.overdue += 1;
        }
    }

    for row in &mut rows {
        row.load = LoadLevel::classify(row.active);
        row.capacity = capacity_percent(row.active);
        row.success_rate = percent_half_up(row.total - row.active, row.total);
    }
    rows.sort_by(|a, b| b.active.cmp(&a.active));
    rows
}

#[cfg(test)]
mod tests {
    use super::{capacity_percent, LoadLevel};

    #[test]
    fn capacity_is_capped_at_full() {
        assert_eq!(capacity_percent(0), 0);
        assert_eq!(capacity_percent(3), 30);
        assert_eq!(capacity_percent(12), 100);
    }

    #[test]
    fn classify_uses_fixed_thresholds() {
        assert_eq!(LoadLevel::classify(0), LoadLevel::Healthy);
        assert_eq!(LoadLevel::classify(4), LoadLevel::Healthy);
        assert_eq!(LoadLevel::classify(5), LoadLevel::Nominal);
        assert_eq!(LoadLevel::classify(9), LoadLevel::Nominal);
        assert_eq!(LoadLevel::classify(10), LoadLevel::Overloaded);
    }
}
