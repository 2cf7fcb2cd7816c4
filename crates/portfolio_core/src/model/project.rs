//! Project domain model.
//!
//! # Invariants
//! - `original_end_date` is the immutable baseline.
//! - Calculated end date, progress and status are derived from tasks and are
//!   not stored here. Stale derived fields in old snapshots are ignored on
//!   decode.

use crate::model::validation::{require_text, ValidationError};
use crate::model::{new_entity_id, ProjectId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    /// Baseline end date agreed at project creation.
    pub original_end_date: NaiveDate,
}

/// Creation input for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Project {
    /// Builds a project with a fresh id from validated input.
    ///
    /// # Errors
    /// - `BlankField("name")` when the name is blank.
    /// - `InvalidDateRange` when `end_date < start_date`.
    pub fn create(input: NewProject) -> Result<Self, ValidationError> {
        let name = require_text(&input.name, "name")?;
        if input.end_date < input.start_date {
            return Err(ValidationError::InvalidDateRange {
                start: input.start_date,
                end: input.end_date,
            });
        }

        Ok(Self {
            id: new_entity_id("p"),
            name,
            description: input.description.trim().to_string(),
            start_date: input.start_date,
            original_end_date: input.end_date,
        })
    }

    /// Case-insensitive substring match over name and description.
    pub fn matches_text(&self, needle_lowercase: &str) -> bool {
        needle_lowercase.is_empty()
            || self.name.to_lowercase().contains(needle_lowercase)
            || self.description.to_lowercase().contains(needle_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::{NewProject, Project};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn create_rejects_reversed_dates() {
        let err = Project::create(NewProject {
            name: "Launch".to_string(),
            description: String::new(),
            start_date: date("2024-06-01"),
            end_date: date("2024-05-01"),
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDateRange { .. }));
    }

    #[test]
    fn decode_ignores_stale_derived_fields() {
        let value = serde_json::json!({
            "id": "p1",
            "name": "Cloud Migration",
            "startDate": "2024-05-01",
            "originalEndDate": "2024-06-30",
            "calculatedEndDate": "2024-07-02",
            "progress": 45,
            "status": "On Track",
            "description": "Transferring core infrastructure."
        });
        let project: Project = serde_json::from_value(value).unwrap();
        assert_eq!(project.original_end_date, date("2024-06-30"));
        assert!(project.matches_text("cloud"));
        assert!(project.matches_text("infrastructure"));
        assert!(!project.matches_text("mobile"));
    }
}
