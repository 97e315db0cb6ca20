// ABOUTME: Request and response bodies shared by the API and its client
// ABOUTME: Includes the status-mutation endpoint contract

use serde::{Deserialize, Serialize};

use crate::types::{Issue, IssueStatus, Sprint};

/// Body of `POST /functions/v1/update_issue_status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueStatusRequest {
    pub issue_id: String,
    pub to_status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_index: Option<i64>,
}

/// Success body of the status-mutation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateIssueStatusResponse {
    pub ok: bool,
    pub issue: Issue,
}

/// Error body used by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignRequest {
    pub issue_ids: Vec<String>,
    pub sprint_id: Option<String>,
}

/// Result of starting a sprint: the started sprint and any sprint it demoted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintStartResult {
    pub sprint: Sprint,
    pub demoted: Vec<Sprint>,
}

/// Result of ending a sprint: the completed sprint and the issues returned to the backlog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintEndResult {
    pub sprint: Sprint,
    pub detached_issue_ids: Vec<String>,
}
