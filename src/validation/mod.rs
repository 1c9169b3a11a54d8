//! Input validators for `issuehub`.
//!
//! Each validator collects every violated rule; actions report the first one.
//! Lengths count Unicode scalar values of the raw input.

use crate::error::ValidationError;
use crate::model::{CreateIssueInput, CreateProjectInput, UpdateIssueInput, UpdateProjectInput};

pub const PROJECT_NAME_MIN: usize = 2;
pub const PROJECT_NAME_MAX: usize = 50;
pub const PROJECT_DESCRIPTION_MAX: usize = 500;
pub const ISSUE_TITLE_MIN: usize = 3;
pub const ISSUE_TITLE_MAX: usize = 200;

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates project inputs.
pub struct ProjectValidator;

impl ProjectValidator {
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate_create(input: &CreateProjectInput) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_name(&input.name, &mut errors);
        if let Some(description) = input.description.as_deref() {
            check_project_description(description, &mut errors);
        }
        finish(errors)
    }

    /// Same rules as create, applied to the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate_update(input: &UpdateProjectInput) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(name) = input.name.as_deref() {
            check_name(name, &mut errors);
        }
        if let Some(description) = input.description.as_deref() {
            check_project_description(description, &mut errors);
        }
        finish(errors)
    }
}

fn check_name(name: &str, errors: &mut Vec<ValidationError>) {
    let len = name.chars().count();
    if len < PROJECT_NAME_MIN {
        errors.push(ValidationError::new(
            "name",
            format!("Project name must be at least {PROJECT_NAME_MIN} characters"),
        ));
    } else if len > PROJECT_NAME_MAX {
        errors.push(ValidationError::new(
            "name",
            format!("Project name must be at most {PROJECT_NAME_MAX} characters"),
        ));
    }
}

fn check_project_description(description: &str, errors: &mut Vec<ValidationError>) {
    if description.chars().count() > PROJECT_DESCRIPTION_MAX {
        errors.push(ValidationError::new(
            "description",
            format!("Description must be at most {PROJECT_DESCRIPTION_MAX} characters"),
        ));
    }
}

/// Validates issue inputs.
pub struct IssueValidator;

impl IssueValidator {
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate_create(input: &CreateIssueInput) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_title(&input.title, &mut errors);
        finish(errors)
    }

    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate_update(input: &UpdateIssueInput) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(title) = input.title.as_deref() {
            check_title(title, &mut errors);
        }
        finish(errors)
    }
}

fn check_title(title: &str, errors: &mut Vec<ValidationError>) {
    let len = title.chars().count();
    if len < ISSUE_TITLE_MIN {
        errors.push(ValidationError::new(
            "title",
            format!("Title must be at least {ISSUE_TITLE_MIN} characters"),
        ));
    } else if len > ISSUE_TITLE_MAX {
        errors.push(ValidationError::new(
            "title",
            format!("Title must be at most {ISSUE_TITLE_MAX} characters"),
        ));
    }
    if len > 0 && title.trim().is_empty() {
        errors.push(ValidationError::new("title", "Title cannot be blank"));
    }
}
