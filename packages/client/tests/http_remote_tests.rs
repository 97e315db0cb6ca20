// ABOUTME: Tests for the HTTP remote against a mock server
// ABOUTME: Checks request shape, bearer header, and mapping of error bodies

use flowcraft_client::{ClientError, HttpRemote, Remote};
use flowcraft_core::{IssueStatus, UpdateIssueStatusRequest};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn issue_json(status: &str) -> serde_json::Value {
    json!({
        "id": "TSK-007",
        "title": "Fix login",
        "type": "Bug",
        "status": status,
        "priority": "P1",
        "sprintId": null,
        "assigneeId": null,
        "parentId": null,
        "description": "",
        "createdAt": "2024-12-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z"
    })
}

fn remote_for(server: &MockServer) -> HttpRemote {
    HttpRemote::new(server.uri(), Some("secret".to_string()), Duration::from_secs(5)).unwrap()
}

fn status_request() -> UpdateIssueStatusRequest {
    UpdateIssueStatusRequest {
        issue_id: "TSK-007".to_string(),
        to_status: IssueStatus::InProgress,
        sprint_id: None,
        new_index: Some(0),
    }
}

#[tokio::test]
async fn test_update_issue_status_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/update_issue_status"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({
            "issueId": "TSK-007",
            "toStatus": "In Progress",
            "newIndex": 0
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true, "issue": issue_json("In Progress")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let issue = remote_for(&server)
        .update_issue_status(&status_request())
        .await
        .unwrap();

    assert_eq!(issue.status, IssueStatus::InProgress);
    assert_eq!(issue.updated_at.to_rfc3339(), "2025-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn test_update_issue_status_error_bodies() {
    let cases = [
        (401, "Invalid or expired token"),
        (400, "Invalid status value"),
        (404, "Issue not found"),
        (500, "Failed to update issue status"),
    ];

    for (status, message) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/update_issue_status"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"error": message})))
            .mount(&server)
            .await;

        let err = remote_for(&server)
            .update_issue_status(&status_request())
            .await
            .unwrap_err();

        match (status, &err) {
            (401, ClientError::Unauthorized(m))
            | (400, ClientError::BadRequest(m))
            | (404, ClientError::NotFound(m)) => assert_eq!(m, message),
            (500, ClientError::Server { status: 500, message: m }) => assert_eq!(m, message),
            _ => panic!("unexpected mapping for {}: {:?}", status, err),
        }
    }
}

#[tokio::test]
async fn test_ok_false_and_malformed_bodies_are_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/update_issue_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": false, "issue": issue_json("Todo")})),
        )
        .mount(&server)
        .await;

    let err = remote_for(&server)
        .update_issue_status(&status_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/update_issue_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let err = remote_for(&server)
        .update_issue_status(&status_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_list_issues_decodes_camel_case() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue_json("Done")])))
        .mount(&server)
        .await;

    let issues = remote_for(&server).list_issues().await.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].id, "TSK-007");
    assert_eq!(issues[0].status, IssueStatus::Done);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on port 9 (discard) in the test environment
    let remote = HttpRemote::new("http://127.0.0.1:9", None, Duration::from_secs(2)).unwrap();

    let err = remote.list_sprints().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn test_delete_accepts_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/issues/TSK-007"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    remote_for(&server).delete_issue("TSK-007").await.unwrap();
}

#[tokio::test]
async fn test_list_profiles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profiles"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "user-1", "username": "alice", "email": null},
            {"id": "user-2", "username": null, "email": "bob@example.com"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let profiles = remote_for(&server).list_profiles().await.unwrap();

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].display_name(), "alice");
    assert_eq!(profiles[1].display_name(), "bob@example.com");
}
