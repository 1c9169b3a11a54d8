//! Error types and handling for `issuehub`.
//!
//! - `thiserror` derive for the primary enum
//! - `anyhow` wrapped in `Other` for the CLI glue
//! - recovery hints for user-facing errors
//! - structured JSON output via [`StructuredError`]

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `issuehub` operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Auth ===
    /// No caller identity or no active organization.
    #[error("Unauthorized")]
    Unauthorized,

    // === Validation ===
    /// First failing validation rule.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    #[error("Invalid priority: {priority}")]
    InvalidPriority { priority: String },

    // === Lookup ===
    /// Absent, or owned by another tenant. The two cases are indistinguishable.
    #[error("Project not found: {reference}")]
    ProjectNotFound { reference: String },

    /// Absent, or owned by another tenant.
    #[error("Issue not found: {reference}")]
    IssueNotFound { reference: String },

    // === Storage ===
    /// A uniqueness constraint fired (slug or issue number).
    #[error("Conflict: {what}")]
    Conflict { what: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === Workspace / configuration ===
    #[error("Not initialized: run 'ih init' first")]
    NotInitialized,

    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl TrackerError {
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Unauthorized => {
                Some("Set a user and organization: --user/--org, IH_USER/IH_ORG, or config.yaml")
            }
            Self::NotInitialized => Some("Run: ih init"),
            Self::AlreadyInitialized { .. } => Some("Use --force to reinitialize"),
            Self::ProjectNotFound { .. } => Some("Run 'ih project list' to see your projects."),
            Self::InvalidStatus { .. } => Some("Valid statuses: OPEN, IN_PROGRESS, DONE, CLOSED"),
            Self::InvalidPriority { .. } => Some("Valid priorities: LOW, MEDIUM, HIGH, URGENT"),
            Self::Conflict { .. } => Some("Another writer got there first; retry the command"),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Report the first failing rule. An empty list yields a generic failure.
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        errors.into_iter().next().map_or_else(
            || Self::validation("input", "invalid"),
            |err| Self::Validation {
                field: err.field,
                reason: err.message,
            },
        )
    }

    #[must_use]
    pub fn project_not_found(reference: impl Into<String>) -> Self {
        Self::ProjectNotFound {
            reference: reference.into(),
        }
    }

    #[must_use]
    pub fn issue_not_found(reference: impl Into<String>) -> Self {
        Self::IssueNotFound {
            reference: reference.into(),
        }
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;
