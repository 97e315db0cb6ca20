// ABOUTME: Abstraction over the remote store of record
// ABOUTME: Implemented over HTTP in production and by hand-written stubs in tests

use async_trait::async_trait;
use flowcraft_core::{
    BulkAssignRequest, Issue, IssueCreateInput, IssuePatch, Profile, Sprint, SprintCreateInput,
    SprintEndResult, SprintPatch, SprintStartResult, UpdateIssueStatusRequest,
};

use crate::error::ClientResult;

#[async_trait]
pub trait Remote: Send + Sync {
    /// All issues, newest first
    async fn list_issues(&self) -> ClientResult<Vec<Issue>>;

    /// All sprints, newest first
    async fn list_sprints(&self) -> ClientResult<Vec<Sprint>>;

    /// The user directory, ordered by username
    async fn list_profiles(&self) -> ClientResult<Vec<Profile>>;

    async fn create_issue(&self, input: &IssueCreateInput) -> ClientResult<Issue>;

    async fn update_issue(&self, issue_id: &str, patch: &IssuePatch) -> ClientResult<Issue>;

    async fn delete_issue(&self, issue_id: &str) -> ClientResult<()>;

    /// The status-mutation endpoint; returns the issue as stored remotely
    async fn update_issue_status(&self, request: &UpdateIssueStatusRequest)
        -> ClientResult<Issue>;

    async fn bulk_assign(&self, request: &BulkAssignRequest) -> ClientResult<Vec<Issue>>;

    async fn create_sprint(&self, input: &SprintCreateInput) -> ClientResult<Sprint>;

    async fn update_sprint(&self, sprint_id: &str, patch: &SprintPatch) -> ClientResult<Sprint>;

    async fn delete_sprint(&self, sprint_id: &str) -> ClientResult<()>;

    async fn start_sprint(&self, sprint_id: &str) -> ClientResult<SprintStartResult>;

    async fn end_sprint(&self, sprint_id: &str) -> ClientResult<SprintEndResult>;
}
