// ABOUTME: Profile storage: the user directory behind assignee names
// ABOUTME: Profiles are keyed by the same user id that tokens and assignees carry

use chrono::Utc;
use flowcraft_core::{Profile, ValidationError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::rows::encode_timestamp;

pub struct ProfileStorage {
    pool: SqlitePool,
}

fn row_to_profile(row: &SqliteRow) -> StorageResult<Profile> {
    Ok(Profile {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
    })
}

/// Blank strings are stored as NULL so display fallbacks skip them
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl ProfileStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every profile ordered by username, unnamed profiles last
    pub async fn list_profiles(&self) -> StorageResult<Vec<Profile>> {
        debug!("Fetching all profiles");

        let rows = sqlx::query(
            "SELECT id, username, email FROM profiles ORDER BY username IS NULL, username, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_profile).collect()
    }

    pub async fn find_profile(&self, user_id: &str) -> StorageResult<Option<Profile>> {
        let row = sqlx::query("SELECT id, username, email FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_profile).transpose()
    }

    /// Create the profile or replace its username and email
    pub async fn upsert_profile(&self, profile: &Profile) -> StorageResult<Profile> {
        let user_id = profile.id.trim();
        if user_id.is_empty() {
            return Err(ValidationError::EmptyProfileId.into());
        }
        debug!("Saving profile: {}", user_id);

        let now = encode_timestamp(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO profiles (id, username, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                email = excluded.email,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(non_blank(profile.username.as_deref()))
        .bind(non_blank(profile.email.as_deref()))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.find_profile(user_id)
            .await?
            .ok_or_else(|| StorageError::InvalidData(format!("profile {} vanished", user_id)))
    }
}
