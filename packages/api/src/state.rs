// ABOUTME: Shared state handed to every request handler
// ABOUTME: Storage handles for issues, sprints, profiles, and tokens plus the CORS policy

use flowcraft_config::CorsPolicy;
use flowcraft_security::TokenStorage;
use flowcraft_storage::{IssueStorage, ProfileStorage, SprintStorage};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub issue_storage: Arc<IssueStorage>,
    pub sprint_storage: Arc<SprintStorage>,
    pub profile_storage: Arc<ProfileStorage>,
    pub token_storage: Arc<TokenStorage>,
    pub cors: Arc<CorsPolicy>,
}

impl ApiState {
    pub fn new(pool: SqlitePool, cors: CorsPolicy) -> Self {
        Self {
            issue_storage: Arc::new(IssueStorage::new(pool.clone())),
            sprint_storage: Arc::new(SprintStorage::new(pool.clone())),
            profile_storage: Arc::new(ProfileStorage::new(pool.clone())),
            token_storage: Arc::new(TokenStorage::new(pool.clone())),
            cors: Arc::new(cors),
            pool,
        }
    }
}
