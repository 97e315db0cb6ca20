// ABOUTME: Input validation for issues and sprints
// ABOUTME: Shared by the store of record and the client so both reject the same inputs

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{IssueCreateInput, IssuePatch, SprintCreateInput};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Sprint name must not be empty")]
    EmptyName,

    #[error("Sprint end date {end} must be after start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid {kind} value: {value}")]
    InvalidEnum { kind: &'static str, value: String },

    #[error("Issue cannot be its own parent: {0}")]
    SelfParent(String),

    #[error("Profile id must not be empty")]
    EmptyProfileId,
}

impl ValidationError {
    pub fn invalid_enum(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidEnum {
            kind,
            value: value.into(),
        }
    }
}

pub fn validate_issue_create(input: &IssueCreateInput) -> Result<(), ValidationError> {
    if input.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_issue_patch(issue_id: &str, patch: &IssuePatch) -> Result<(), ValidationError> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
    }
    if let Some(Some(parent_id)) = &patch.parent_id {
        if parent_id == issue_id {
            return Err(ValidationError::SelfParent(issue_id.to_string()));
        }
    }
    Ok(())
}

/// End date must be strictly after start date
pub fn validate_sprint_dates(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::InvalidDateRange { start, end });
    }
    Ok(())
}

pub fn validate_sprint_create(input: &SprintCreateInput) -> Result<(), ValidationError> {
    if input.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    validate_sprint_dates(input.start_date, input.end_date)
}
