// ABOUTME: Storage operations for identity tokens
// ABOUTME: Token generation, hashing, verification, and database operations

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use flowcraft_storage::StorageError;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::api_tokens::types::{ApiToken, TokenGeneration};

pub struct TokenStorage {
    pool: SqlitePool,
}

impl TokenStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random token
    /// Returns a base64-encoded 32-byte token
    pub fn generate_token() -> String {
        let mut rng = rand::thread_rng();
        let random_bytes: [u8; 32] = rng.gen();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
    }

    /// Hash a token using SHA-256
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compare a token against a stored hash in constant time
    pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
        use subtle::ConstantTimeEq;

        let computed_hash = Self::hash_token(token);
        computed_hash
            .as_bytes()
            .ct_eq(stored_hash.as_bytes())
            .into()
    }

    /// Mint a token that authenticates as `user_id`
    pub async fn create_token(
        &self,
        name: &str,
        user_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<TokenGeneration, StorageError> {
        let id = Uuid::new_v4().to_string();
        let token = Self::generate_token();
        let token_hash = Self::hash_token(&token);

        debug!("Creating identity token '{}' for user {}", name, user_id);

        sqlx::query(
            "INSERT INTO api_tokens (id, token_hash, name, user_id, created_at, expires_at, is_active)
             VALUES (?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(&id)
        .bind(&token_hash)
        .bind(name)
        .bind(user_id)
        .bind(encode_timestamp(Utc::now()))
        .bind(expires_at.map(encode_timestamp))
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let record = self
            .get_token(&id)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                entity: "Token",
                id: id.clone(),
            })?;

        Ok(TokenGeneration { token, record })
    }

    /// Resolve a bearer secret to its token record.
    ///
    /// Unknown, revoked, and expired tokens all yield `None`.
    pub async fn verify_token(&self, token: &str) -> Result<Option<ApiToken>, StorageError> {
        let token_hash = Self::hash_token(token);

        let row = sqlx::query("SELECT * FROM api_tokens WHERE token_hash = ? AND is_active = 1")
            .bind(&token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let record = row_to_token(&row)?;

        // Double-check with constant-time comparison
        if !Self::verify_token_hash(token, &record.token_hash) {
            return Ok(None);
        }

        if !record.is_usable(Utc::now()) {
            debug!("Rejected expired token {}", record.id);
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Update the last_used_at timestamp for a token
    pub async fn update_last_used(&self, token_hash: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE token_hash = ? AND is_active = 1")
            .bind(encode_timestamp(Utc::now()))
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(())
    }

    /// List all tokens, newest first
    pub async fn list_tokens(&self) -> Result<Vec<ApiToken>, StorageError> {
        let rows = sqlx::query("SELECT * FROM api_tokens ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_token).collect()
    }

    pub async fn get_token(&self, id: &str) -> Result<Option<ApiToken>, StorageError> {
        let row = sqlx::query("SELECT * FROM api_tokens WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_token).transpose()
    }

    /// Revoke a token (set is_active = 0)
    pub async fn revoke_token(&self, id: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE api_tokens SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "Token",
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidData(format!("token timestamp '{}': {}", raw, e)))
}

fn row_to_token(row: &sqlx::sqlite::SqliteRow) -> Result<ApiToken, StorageError> {
    let created_at: String = row.try_get("created_at")?;
    let last_used_at: Option<String> = row.try_get("last_used_at")?;
    let expires_at: Option<String> = row.try_get("expires_at")?;

    Ok(ApiToken {
        id: row.try_get("id")?,
        token_hash: row.try_get("token_hash")?,
        name: row.try_get("name")?,
        user_id: row.try_get("user_id")?,
        created_at: decode_timestamp(&created_at)?,
        last_used_at: last_used_at.as_deref().map(decode_timestamp).transpose()?,
        expires_at: expires_at.as_deref().map(decode_timestamp).transpose()?,
        is_active: row.try_get::<i64, _>("is_active")? != 0,
    })
}
