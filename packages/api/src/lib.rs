// ABOUTME: HTTP API layer for Flowcraft providing REST endpoints and routing
// ABOUTME: Serves the data endpoints and the status-mutation function over one SQLite store

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod cors;
pub mod error;
pub mod issues_handlers;
pub mod profiles_handlers;
pub mod sprints_handlers;
pub mod state;
pub mod status_handlers;

pub use error::ApiError;
pub use state::ApiState;

/// Path of the status-mutation function, relative to the server root
pub const UPDATE_ISSUE_STATUS_PATH: &str = "/functions/v1/update_issue_status";

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "flowcraft" }))
}

/// Creates the issues API router (nested under /api/issues)
pub fn create_issues_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/",
            get(issues_handlers::list_issues).post(issues_handlers::create_issue),
        )
        .route("/bulk-assign", post(issues_handlers::bulk_assign))
        .route(
            "/{id}",
            get(issues_handlers::get_issue)
                .patch(issues_handlers::update_issue)
                .delete(issues_handlers::delete_issue),
        )
}

/// Creates the sprints API router (nested under /api/sprints)
pub fn create_sprints_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/",
            get(sprints_handlers::list_sprints).post(sprints_handlers::create_sprint),
        )
        .route(
            "/{id}",
            get(sprints_handlers::get_sprint)
                .patch(sprints_handlers::update_sprint)
                .delete(sprints_handlers::delete_sprint),
        )
        .route("/{id}/start", post(sprints_handlers::start_sprint))
        .route("/{id}/end", post(sprints_handlers::end_sprint))
}

/// Creates the profiles API router (nested under /api/profiles)
pub fn create_profiles_router() -> Router<ApiState> {
    Router::new()
        .route("/", get(profiles_handlers::list_profiles))
        .route("/{id}", put(profiles_handlers::put_profile))
}

/// Creates the status function router; every response carries CORS headers
pub fn create_function_router(state: &ApiState) -> Router<ApiState> {
    Router::new()
        .route(
            UPDATE_ISSUE_STATUS_PATH,
            post(status_handlers::update_issue_status)
                .options(cors::preflight)
                .head(cors::preflight),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cors::function_cors,
        ))
}

/// Assemble the full application
pub fn create_router(state: ApiState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .nest("/issues", create_issues_router())
        .nest("/sprints", create_sprints_router())
        .nest("/profiles", create_profiles_router())
        .layer(cors::api_cors_layer(&state.cors));

    Router::new()
        .nest("/api", api)
        .merge(create_function_router(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
