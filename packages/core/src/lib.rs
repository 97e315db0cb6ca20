// ABOUTME: Core types, enumerations, and reporting helpers for Flowcraft
// ABOUTME: Foundational package shared by the store of record, the API, and the client

pub mod constants;
pub mod filters;
pub mod metrics;
pub mod types;
pub mod utils;
pub mod validation;
pub mod wire;

// Re-export main types
pub use types::{
    assignee_name, Issue, IssueCreateInput, IssuePatch, IssueStatus, IssueType, Priority,
    Profile, Sprint, SprintCreateInput, SprintPatch, SprintStatus, UserRef,
};

// Re-export constants
pub use constants::{database_file, events_file, flowcraft_dir};

// Re-export utilities
pub use utils::{format_issue_id, format_sprint_id, parse_sequence, IdKind};

// Re-export validation
pub use validation::{
    validate_issue_create, validate_issue_patch, validate_sprint_create, validate_sprint_dates,
    ValidationError,
};

// Re-export wire contract
pub use wire::{
    BulkAssignRequest, ErrorBody, SprintEndResult, SprintStartResult, UpdateIssueStatusRequest,
    UpdateIssueStatusResponse,
};
