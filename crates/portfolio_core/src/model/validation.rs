//! Input validation errors shared by project, task and decision creation.

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected creation input. Never raised for persisted data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is blank after trim.
    BlankField(&'static str),
    /// End date precedes start date.
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidDateRange { start, end } => {
                write!(f, "end date ({end}) must be >= start date ({start})")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{require_text, ValidationError};

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("  Launch ", "name").unwrap(), "Launch");
        assert_eq!(
            require_text(" \n ", "name").unwrap_err(),
            ValidationError::BlankField("name")
        );
    }
}
