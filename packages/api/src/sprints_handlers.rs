// ABOUTME: HTTP request handlers for sprint operations
// ABOUTME: CRUD plus the start and end lifecycle transitions

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use flowcraft_core::{Sprint, SprintCreateInput, SprintEndResult, SprintPatch, SprintStartResult};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::{json_body, ApiError};
use crate::state::ApiState;

pub async fn list_sprints(
    State(state): State<ApiState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Sprint>>, ApiError> {
    info!("Listing sprints");
    Ok(Json(state.sprint_storage.list_sprints().await?))
}

pub async fn get_sprint(
    State(state): State<ApiState>,
    _user: CurrentUser,
    Path(sprint_id): Path<String>,
) -> Result<Json<Sprint>, ApiError> {
    info!("Getting sprint: {}", sprint_id);
    Ok(Json(state.sprint_storage.get_sprint(&sprint_id).await?))
}

pub async fn create_sprint(
    State(state): State<ApiState>,
    user: CurrentUser,
    payload: Result<Json<SprintCreateInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Sprint>), ApiError> {
    let input = json_body(payload)?;
    info!("Creating sprint: {}", input.name);

    let sprint = state
        .sprint_storage
        .create_sprint(&input, Some(&user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(sprint)))
}

pub async fn update_sprint(
    State(state): State<ApiState>,
    _user: CurrentUser,
    Path(sprint_id): Path<String>,
    payload: Result<Json<SprintPatch>, JsonRejection>,
) -> Result<Json<Sprint>, ApiError> {
    let patch = json_body(payload)?;
    info!("Updating sprint: {}", sprint_id);
    Ok(Json(
        state.sprint_storage.update_sprint(&sprint_id, &patch).await?,
    ))
}

/// Delete a sprint; its issues fall back to the backlog
pub async fn delete_sprint(
    State(state): State<ApiState>,
    _user: CurrentUser,
    Path(sprint_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("Deleting sprint: {}", sprint_id);
    state.sprint_storage.delete_sprint(&sprint_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_sprint(
    State(state): State<ApiState>,
    _user: CurrentUser,
    Path(sprint_id): Path<String>,
) -> Result<Json<SprintStartResult>, ApiError> {
    info!("Starting sprint: {}", sprint_id);
    Ok(Json(state.sprint_storage.start_sprint(&sprint_id).await?))
}

pub async fn end_sprint(
    State(state): State<ApiState>,
    _user: CurrentUser,
    Path(sprint_id): Path<String>,
) -> Result<Json<SprintEndResult>, ApiError> {
    info!("Ending sprint: {}", sprint_id);
    Ok(Json(state.sprint_storage.end_sprint(&sprint_id).await?))
}
