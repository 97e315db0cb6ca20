// ABOUTME: CORS handling for the API
// ABOUTME: Allow-list origin echo for the status function and a tower-http layer for /api

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE, ORIGIN, VARY,
        },
        HeaderValue, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use flowcraft_config::CorsPolicy;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::state::ApiState;

pub const ALLOW_METHODS: &str = "POST, OPTIONS, HEAD";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const MAX_AGE_SECS: &str = "86400";

/// Attach the function's CORS headers to every response, errors included
pub async fn function_cors(State(state): State<ApiState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;

    let allowed = state.cors.resolve_origin(origin.as_deref());
    let headers = response.headers_mut();
    match HeaderValue::from_str(allowed) {
        Ok(value) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        Err(e) => warn!(error = %e, origin = %allowed, "Unusable CORS origin"),
    }
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
    headers.insert(VARY, HeaderValue::from_static("Origin"));

    response
}

/// Preflight and HEAD always succeed
pub async fn preflight() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/json")], "ok")
}

/// CORS layer for the data endpoints, built from the same allow-list
pub fn api_cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let origins: Vec<HeaderValue> = policy
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            CONTENT_TYPE,
        ])
}
