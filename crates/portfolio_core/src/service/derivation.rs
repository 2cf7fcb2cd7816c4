//! Derived project fields.
//!
//! # Responsibility
//! - Compute calculated end date, progress and status of a project from its
//!   tasks.
//! - Compute project health and the portfolio summary shown by dashboards
//!   and reports.
//!
//! # Invariants
//! - Every function here is pure; results are recomputed on each call.
//! - `calculated_end_date >= original_end_date`.
//! - Status rules apply in fixed precedence: delay, then risk, then
//!   completion.

use crate::model::project::Project;
use crate::model::risk::{Risk, RiskSeverity};
use crate::model::task::{Task, TaskStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// Derived project status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProjectStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "At Risk")]
    AtRisk,
    Delayed,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::AtRisk => "At Risk",
            Self::Delayed => "Delayed",
            Self::Completed => "Completed",
        }
    }
}

/// Project record plus its derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub calculated_end_date: NaiveDate,
    /// Percentage of done tasks, 0..=100.
    pub progress: u8,
    pub status: ProjectStatus,
    pub task_count: usize,
}

impl ProjectView {
    pub fn is_delayed(&self) -> bool {
        self.calculated_end_date > self.project.original_end_date
    }
}

/// Derives the view of `project` from the tasks that belong to it.
///
/// # Contract
/// - `calculated_end_date` is the later of the baseline and the latest task
///   due date; the baseline when there are no tasks.
/// - `progress = round(100 * done / total)` half-up, 0 without tasks.
/// - Status: `Delayed` if past baseline, else `At Risk` if any task is
///   blocked or at risk, else `Completed` at 100% with tasks, else
///   `On Track`.
pub fn derive_project_view<'a, I>(project: &Project, tasks_of_project: I) -> ProjectView
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut calculated_end_date = project.original_end_date;
    let mut total = 0usize;
    let mut done = 0usize;
    let mut has_risk = false;

    for task in tasks_of_project {
        total += 1;
        if task.due_date > calculated_end_date {
            calculated_end_date = task.due_date;
        }
        match task.status() {
            TaskStatus::Done => done += 1,
            TaskStatus::Blocked | TaskStatus::AtRisk => has_risk = true,
            TaskStatus::Todo | TaskStatus::InProgress => {}
        }
    }

    let progress = percent_half_up(done, total);
    let status = if calculated_end_date > project.original_end_date {
        ProjectStatus::Delayed
    } else if has_risk {
        ProjectStatus::AtRisk
    } else if progress == 100 && total > 0 {
        ProjectStatus::Completed
    } else {
        ProjectStatus::OnTrack
    };

    ProjectView {
        project: project.clone(),
        calculated_end_date,
        progress,
        status,
        task_count: total,
    }
}

/// Coarse health badge of one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectHealth {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "AT RISK")]
    AtRisk,
    #[serde(rename = "HEALTHY")]
    Healthy,
}

/// More than this many overdue tasks makes a project critical.
pub const CRITICAL_OVERDUE_THRESHOLD: usize = 2;

/// Health of one project as of `today`.
///
/// `Critical` with any blocked task or more than two overdue tasks;
/// `AtRisk` with any overdue task or when delayed; `Healthy` otherwise.
pub fn project_health<'a, I>(view: &ProjectView, tasks_of_project: I, today: NaiveDate) -> ProjectHealth
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut blocked = 0usize;
    let mut overdue = 0usize;
    for task in tasks_of_project {
        if task.is_blocked() {
            blocked += 1;
        }
        if task.is_overdue(today) {
            overdue += 1;
        }
    }

    if blocked > 0 || overdue > CRITICAL_OVERDUE_THRESHOLD {
        ProjectHealth::Critical
    } else if overdue > 0 || view.is_delayed() {
        ProjectHealth::AtRisk
    } else {
        ProjectHealth::Healthy
    }
}

/// Portfolio-wide counters for dashboards and reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub project_count: usize,
    pub on_track: usize,
    pub at_risk: usize,
    pub delayed: usize,
    pub completed: usize,
    /// Mean project progress, rounded half-up; 0 without projects.
    pub average_progress: u8,
    pub task_count: usize,
    pub blocked_tasks: usize,
    pub overdue_tasks: usize,
    pub open_risks: usize,
    pub open_high_risks: usize,
}

/// Aggregates derived views, tasks and risks as of `today`.
pub fn portfolio_summary(
    views: &[ProjectView],
    tasks: &[Task],
    risks: &[Risk],
    today: NaiveDate,
) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        project_count: views.len(),
        task_count: tasks.len(),
        ..PortfolioSummary::default()
    };

    let mut progress_total = 0usize;
    for view in views {
        progress_total += usize::from(view.progress);
        match view.status {
            ProjectStatus::OnTrack => summary.on_track += 1,
            ProjectStatus::AtRisk => summary.at_risk += 1,
            ProjectStatus::Delayed => summary.delayed += 1,
            ProjectStatus::Completed => summary.completed += 1,
        }
    }
    if !views.is_empty() {
        summary.average_progress = round_half_up(progress_total, views.len());
    }

    summary.blocked_tasks = tasks.iter().filter(|task| task.is_blocked()).count();
    summary.overdue_tasks = tasks.iter().filter(|task| task.is_overdue(today)).count();
    summary.open_risks = risks.iter().filter(|risk| risk.is_open()).count();
    summary.open_high_risks = risks
        .iter()
        .filter(|risk| risk.is_open() && risk.severity == RiskSeverity::High)
        .count();
    summary
}

pub(crate) fn percent_half_up(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    round_half_up(part * 100, total)
}

fn round_half_up(numerator: usize, denominator: usize) -> u8 {
    let rounded = (numerator * 2 + denominator) / (denominator * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::{percent_half_up, round_half_up};

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent_half_up(0, 0), 0);
        assert_eq!(percent_half_up(1, 3), 33);
        assert_eq!(percent_half_up(2, 3), 67);
        assert_eq!(percent_half_up(1, 8), 13);
        assert_eq!(percent_half_up(1, 2), 50);
        assert_eq!(percent_half_up(4, 4), 100);
    }

    #[test]
    fn average_rounds_half_up() {
        assert_eq!(round_half_up(45 + 20 + 10 + 6, 4), 20);
        assert_eq!(round_half_up(1, 2), 1);
    }
}
