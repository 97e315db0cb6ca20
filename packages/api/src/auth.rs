// ABOUTME: Bearer-token authentication for API requests
// ABOUTME: Resolves the Authorization header to the user the token was minted for

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use flowcraft_security::TokenStorage;
use tracing::{debug, warn};

use crate::error::{ApiError, INTERNAL_SERVER_ERROR, INVALID_TOKEN, MISSING_AUTHORIZATION};
use crate::state::ApiState;

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub token_id: String,
}

/// Verify the bearer token in `headers`
pub async fn authenticate(headers: &HeaderMap, state: &ApiState) -> Result<CurrentUser, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        warn!("Request without authorization header");
        return Err(ApiError::Unauthorized(MISSING_AUTHORIZATION));
    };

    let raw = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized(INVALID_TOKEN))?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        warn!("Empty bearer token");
        return Err(ApiError::Unauthorized(INVALID_TOKEN));
    }

    let record = state.token_storage.verify_token(token).await.map_err(|e| {
        warn!(error = %e, "Token verification failed");
        ApiError::Internal(INTERNAL_SERVER_ERROR)
    })?;

    let Some(record) = record else {
        warn!("Invalid or expired bearer token");
        return Err(ApiError::Unauthorized(INVALID_TOKEN));
    };

    // Update last used timestamp; failure must not fail the request
    if let Err(e) = state
        .token_storage
        .update_last_used(&TokenStorage::hash_token(token))
        .await
    {
        warn!(error = %e, "Failed to update token last_used timestamp");
    }

    debug!(user_id = %record.user_id, "Bearer token validated");
    Ok(CurrentUser {
        id: record.user_id,
        token_id: record.id,
    })
}

impl FromRequestParts<ApiState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state).await
    }
}
