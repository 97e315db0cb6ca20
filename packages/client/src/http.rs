// ABOUTME: HTTP implementation of the remote store client
// ABOUTME: Bearer-authenticated JSON calls against the Flowcraft API

use async_trait::async_trait;
use flowcraft_config::ClientConfig;
use flowcraft_core::{
    BulkAssignRequest, ErrorBody, Issue, IssueCreateInput, IssuePatch, Profile, Sprint,
    SprintCreateInput, SprintEndResult, SprintPatch, SprintStartResult, UpdateIssueStatusRequest,
    UpdateIssueStatusResponse,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::remote::Remote;

/// Path of the status-mutation function
pub const UPDATE_ISSUE_STATUS_PATH: &str = "/functions/v1/update_issue_status";

#[derive(Clone)]
pub struct HttpRemote {
    http_client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> ClientResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(
            config.api_url.clone(),
            config.token.clone(),
            config.http_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer header when a token is configured
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        Ok(self.authorized(builder).send().await?)
    }

    /// Check the API is reachable (unauthenticated)
    pub async fn health(&self) -> ClientResult<bool> {
        let response = self
            .http_client
            .get(self.url("/api/health"))
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

/// Decode a success body, or turn the `{ error }` body into a typed error
async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(read_error(response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

async fn read_empty(response: Response) -> ClientResult<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(read_error(response).await)
    }
}

async fn read_error(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.error,
        Err(_) if text.is_empty() => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) => text,
    };

    if status == StatusCode::UNAUTHORIZED {
        warn!("Remote rejected credentials: {}", message);
    }
    ClientError::from_status(status.as_u16(), message)
}

#[async_trait]
impl Remote for HttpRemote {
    async fn list_issues(&self) -> ClientResult<Vec<Issue>> {
        debug!("Loading issues from {}", self.base_url);
        let response = self
            .send(self.http_client.get(self.url("/api/issues")))
            .await?;
        read_json(response).await
    }

    async fn list_sprints(&self) -> ClientResult<Vec<Sprint>> {
        debug!("Loading sprints from {}", self.base_url);
        let response = self
            .send(self.http_client.get(self.url("/api/sprints")))
            .await?;
        read_json(response).await
    }

    async fn list_profiles(&self) -> ClientResult<Vec<Profile>> {
        debug!("Loading profiles from {}", self.base_url);
        let response = self
            .send(self.http_client.get(self.url("/api/profiles")))
            .await?;
        read_json(response).await
    }

    async fn create_issue(&self, input: &IssueCreateInput) -> ClientResult<Issue> {
        let response = self
            .send(self.http_client.post(self.url("/api/issues")).json(input))
            .await?;
        read_json(response).await
    }

    async fn update_issue(&self, issue_id: &str, patch: &IssuePatch) -> ClientResult<Issue> {
        let response = self
            .send(
                self.http_client
                    .patch(self.url(&format!("/api/issues/{}", issue_id)))
                    .json(patch),
            )
            .await?;
        read_json(response).await
    }

    async fn delete_issue(&self, issue_id: &str) -> ClientResult<()> {
        let response = self
            .send(
                self.http_client
                    .delete(self.url(&format!("/api/issues/{}", issue_id))),
            )
            .await?;
        read_empty(response).await
    }

    async fn update_issue_status(
        &self,
        request: &UpdateIssueStatusRequest,
    ) -> ClientResult<Issue> {
        debug!(
            "Requesting status change of {} to {}",
            request.issue_id, request.to_status
        );
        let response = self
            .send(
                self.http_client
                    .post(self.url(UPDATE_ISSUE_STATUS_PATH))
                    .json(request),
            )
            .await?;

        let body: UpdateIssueStatusResponse = read_json(response).await?;
        if !body.ok {
            return Err(ClientError::InvalidResponse(
                "status update returned ok: false".to_string(),
            ));
        }
        Ok(body.issue)
    }

    async fn bulk_assign(&self, request: &BulkAssignRequest) -> ClientResult<Vec<Issue>> {
        let response = self
            .send(
                self.http_client
                    .post(self.url("/api/issues/bulk-assign"))
                    .json(request),
            )
            .await?;
        read_json(response).await
    }

    async fn create_sprint(&self, input: &SprintCreateInput) -> ClientResult<Sprint> {
        let response = self
            .send(self.http_client.post(self.url("/api/sprints")).json(input))
            .await?;
        read_json(response).await
    }

    async fn update_sprint(&self, sprint_id: &str, patch: &SprintPatch) -> ClientResult<Sprint> {
        let response = self
            .send(
                self.http_client
                    .patch(self.url(&format!("/api/sprints/{}", sprint_id)))
                    .json(patch),
            )
            .await?;
        read_json(response).await
    }

    async fn delete_sprint(&self, sprint_id: &str) -> ClientResult<()> {
        let response = self
            .send(
                self.http_client
                    .delete(self.url(&format!("/api/sprints/{}", sprint_id))),
            )
            .await?;
        read_empty(response).await
    }

    async fn start_sprint(&self, sprint_id: &str) -> ClientResult<SprintStartResult> {
        let response = self
            .send(
                self.http_client
                    .post(self.url(&format!("/api/sprints/{}/start", sprint_id))),
            )
            .await?;
        read_json(response).await
    }

    async fn end_sprint(&self, sprint_id: &str) -> ClientResult<SprintEndResult> {
        let response = self
            .send(
                self.http_client
                    .post(self.url(&format!("/api/sprints/{}/end", sprint_id))),
            )
            .await?;
        read_json(response).await
    }
}
