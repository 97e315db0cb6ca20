// ABOUTME: HTTP request handlers for issue operations
// ABOUTME: CRUD plus bulk sprint assignment, all behind bearer authentication

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use flowcraft_core::{BulkAssignRequest, Issue, IssueCreateInput, IssuePatch};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::{json_body, ApiError};
use crate::state::ApiState;

/// List every issue, newest first
pub async fn list_issues(
    State(state): State<ApiState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Issue>>, ApiError> {
    info!("Listing issues");
    Ok(Json(state.issue_storage.list_issues().await?))
}

pub async fn get_issue(
    State(state): State<ApiState>,
    _user: CurrentUser,
    Path(issue_id): Path<String>,
) -> Result<Json<Issue>, ApiError> {
    info!("Getting issue: {}", issue_id);
    Ok(Json(state.issue_storage.get_issue(&issue_id).await?))
}

/// Create an issue owned by the calling user
pub async fn create_issue(
    State(state): State<ApiState>,
    user: CurrentUser,
    payload: Result<Json<IssueCreateInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Issue>), ApiError> {
    let input = json_body(payload)?;
    info!("Creating issue: {}", input.title);

    let issue = state
        .issue_storage
        .create_issue(&input, Some(&user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

pub async fn update_issue(
    State(state): State<ApiState>,
    _user: CurrentUser,
    Path(issue_id): Path<String>,
    payload: Result<Json<IssuePatch>, JsonRejection>,
) -> Result<Json<Issue>, ApiError> {
    let patch = json_body(payload)?;
    info!("Updating issue: {}", issue_id);
    Ok(Json(state.issue_storage.update_issue(&issue_id, &patch).await?))
}

pub async fn delete_issue(
    State(state): State<ApiState>,
    _user: CurrentUser,
    Path(issue_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("Deleting issue: {}", issue_id);
    state.issue_storage.delete_issue(&issue_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign many issues to one sprint, or to the backlog when `sprintId` is null
pub async fn bulk_assign(
    State(state): State<ApiState>,
    _user: CurrentUser,
    payload: Result<Json<BulkAssignRequest>, JsonRejection>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let request = json_body(payload)?;
    info!(
        "Bulk assigning {} issues to {:?}",
        request.issue_ids.len(),
        request.sprint_id
    );

    let issues = state
        .issue_storage
        .bulk_assign(&request.issue_ids, request.sprint_id.as_deref())
        .await?;
    Ok(Json(issues))
}
