// ABOUTME: Status-mutation function: authoritative write behind optimistic board moves
// ABOUTME: Validates the request loosely the way browsers send it, then persists the new status

use axum::{body::Bytes, extract::State, Json};
use flowcraft_core::{IssueStatus, UpdateIssueStatusResponse};
use flowcraft_storage::StorageError;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::ApiState;

pub const MISSING_FIELDS: &str = "Missing required fields: issueId, toStatus";
pub const INVALID_STATUS: &str = "Invalid status value";
pub const ISSUE_NOT_FOUND: &str = "Issue not found";
pub const UPDATE_FAILED: &str = "Failed to update issue status";

/// Empty strings, zero, `false`, and `null` all count as absent
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn field<'a>(payload: &'a Value, name: &str) -> Option<&'a Value> {
    payload.get(name).filter(|v| is_present(v))
}

/// Non-string ids are compared by their JSON text and simply never match
fn issue_id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn update_issue_status(
    State(state): State<ApiState>,
    user: CurrentUser,
    body: Bytes,
) -> Result<Json<UpdateIssueStatusResponse>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        debug!("Unparseable status request body: {}", e);
        ApiError::BadRequest(MISSING_FIELDS.to_string())
    })?;

    let (Some(issue_id), Some(to_status)) = (field(&payload, "issueId"), field(&payload, "toStatus"))
    else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    };

    let issue_id = issue_id_text(issue_id);
    let to_status: IssueStatus = to_status
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::BadRequest(INVALID_STATUS.to_string()))?;

    info!(
        user_id = %user.id,
        issue_id = %issue_id,
        to_status = %to_status,
        "Updating issue status"
    );
    debug!(
        sprint_id = ?payload.get("sprintId"),
        new_index = payload.get("newIndex").and_then(serde_json::Value::as_i64).unwrap_or(0),
        "Board placement hints"
    );

    match state.issue_storage.find_issue(&issue_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ApiError::NotFound(ISSUE_NOT_FOUND.to_string())),
        Err(e) => {
            error!(error = %e, issue_id = %issue_id, "Issue lookup failed");
            return Err(ApiError::NotFound(ISSUE_NOT_FOUND.to_string()));
        }
    }

    let issue = state
        .issue_storage
        .update_issue_status(&issue_id, to_status)
        .await
        .map_err(|e| match e {
            StorageError::NotFound { .. } => {
                warn!(issue_id = %issue_id, "Issue vanished before status update");
                ApiError::NotFound(ISSUE_NOT_FOUND.to_string())
            }
            e => {
                error!(error = %e, issue_id = %issue_id, "Status update failed");
                ApiError::Internal(UPDATE_FAILED)
            }
        })?;

    Ok(Json(UpdateIssueStatusResponse { ok: true, issue }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presence_follows_falsy_values() {
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!(false)));
        assert!(is_present(&json!("TSK-001")));
        assert!(is_present(&json!(7)));
        assert!(is_present(&json!({})));
    }

    #[test]
    fn test_issue_id_text() {
        assert_eq!(issue_id_text(&json!("TSK-001")), "TSK-001");
        assert_eq!(issue_id_text(&json!(12)), "12");
    }
}
