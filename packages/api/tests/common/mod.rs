// ABOUTME: Shared fixtures for router tests
// ABOUTME: In-memory database, a minted bearer token, and request helpers

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use flowcraft_api::{create_router, ApiState};
use flowcraft_config::CorsPolicy;
use flowcraft_storage::connect_in_memory;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: ApiState,
    pub token: String,
}

pub async fn setup() -> TestApp {
    let pool = connect_in_memory().await.unwrap();
    let state = ApiState::new(pool, CorsPolicy::default());
    let token = state
        .token_storage
        .create_token("tests", "user-1", None)
        .await
        .unwrap()
        .token;

    TestApp {
        router: create_router(state.clone()),
        state,
        token,
    }
}

impl TestApp {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Authenticated JSON request
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", self.bearer())
            .header("content-type", "application/json");
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };

        let response = self.send(builder.body(body).unwrap()).await;
        let status = response.status();
        (status, read_json(response).await)
    }
}

/// Response body as JSON; `Value::Null` for empty bodies
pub async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}
