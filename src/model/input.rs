//! Action inputs.
//!
//! Raw inputs mirror what a form or CLI hands in: optional fields, and the
//! empty string meaning "clear". [`ProjectUpdate`] and [`IssueUpdate`] are
//! the normalized forms the store and the activity diff work with.

use serde::{Deserialize, Serialize};

use super::{Priority, Status};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateProjectInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateProjectInput {
    #[serde(default)]
    pub name: Option<String>,
    /// `Some("")` clears the description.
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateIssueInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assignee_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateIssueInput {
    #[serde(default)]
    pub title: Option<String>,
    /// `Some("")` clears the description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// `Some("")` unassigns.
    #[serde(default)]
    pub assignee_id: Option<String>,
}

/// Normalized project update. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

/// Normalized issue update. Outer `None` leaves a field untouched; for the
/// nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Option<String>>,
}

/// Empty string becomes `None`.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(ToString::to_string)
}

impl From<UpdateProjectInput> for ProjectUpdate {
    fn from(input: UpdateProjectInput) -> Self {
        Self {
            name: input.name,
            description: input
                .description
                .as_deref()
                .map(|d| non_empty(Some(d))),
        }
    }
}

impl From<UpdateIssueInput> for IssueUpdate {
    fn from(input: UpdateIssueInput) -> Self {
        Self {
            title: input.title,
            description: input
                .description
                .as_deref()
                .map(|d| non_empty(Some(d))),
            status: input.status,
            priority: input.priority,
            assignee_id: input
                .assignee_id
                .as_deref()
                .map(|a| non_empty(Some(a))),
        }
    }
}

/// Result of a delete action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub success: bool,
}
