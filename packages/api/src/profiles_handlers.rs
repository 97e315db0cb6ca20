// ABOUTME: HTTP request handlers for the profile directory
// ABOUTME: Lists profiles for name resolution and saves a profile under a user id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use flowcraft_core::Profile;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::{json_body, ApiError};
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn list_profiles(
    State(state): State<ApiState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Profile>>, ApiError> {
    info!("Listing profiles");
    Ok(Json(state.profile_storage.list_profiles().await?))
}

pub async fn put_profile(
    State(state): State<ApiState>,
    user: CurrentUser,
    Path(user_id): Path<String>,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let input = json_body(payload)?;
    info!(caller = %user.id, "Saving profile: {}", user_id);

    let profile = Profile {
        id: user_id,
        username: input.username,
        email: input.email,
    };
    Ok(Json(state.profile_storage.upsert_profile(&profile).await?))
}
