// ABOUTME: Sprint storage layer using SQLite
// ABOUTME: CRUD plus the start/end lifecycle with its issue side effects

use chrono::Utc;
use flowcraft_core::{
    validate_sprint_create, validate_sprint_dates, IdKind, Sprint, SprintCreateInput,
    SprintEndResult, SprintPatch, SprintStartResult, SprintStatus, ValidationError,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::rows::{encode_date, encode_timestamp, row_to_sprint};
use crate::sequences::next_id;

pub struct SprintStorage {
    pool: SqlitePool,
}

impl SprintStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every sprint, newest first
    pub async fn list_sprints(&self) -> StorageResult<Vec<Sprint>> {
        debug!("Fetching all sprints");

        let rows = sqlx::query("SELECT * FROM sprints ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_sprint).collect()
    }

    pub async fn find_sprint(&self, sprint_id: &str) -> StorageResult<Option<Sprint>> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        fetch_sprint(&mut conn, sprint_id).await
    }

    pub async fn get_sprint(&self, sprint_id: &str) -> StorageResult<Sprint> {
        debug!("Fetching sprint: {}", sprint_id);

        self.find_sprint(sprint_id)
            .await?
            .ok_or_else(|| StorageError::sprint_not_found(sprint_id))
    }

    pub async fn get_active_sprint(&self) -> StorageResult<Option<Sprint>> {
        let row = sqlx::query("SELECT * FROM sprints WHERE status = 'Active' LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_sprint).transpose()
    }

    pub async fn create_sprint(
        &self,
        input: &SprintCreateInput,
        created_by: Option<&str>,
    ) -> StorageResult<Sprint> {
        validate_sprint_create(input)?;
        debug!("Creating sprint: {}", input.name);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let sprint_id = next_id(&mut tx, IdKind::Sprint).await?;
        let now = encode_timestamp(Utc::now());

        if input.status == SprintStatus::Active {
            demote_active_sprints(&mut tx, &sprint_id, &now).await?;
        }
        let completed_at = (input.status == SprintStatus::Completed).then(|| now.clone());

        sqlx::query(
            r#"
            INSERT INTO sprints (
                id, name, status, start_date, end_date,
                created_at, updated_at, completed_at, created_by
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sprint_id)
        .bind(input.name.trim())
        .bind(input.status.as_str())
        .bind(encode_date(input.start_date))
        .bind(encode_date(input.end_date))
        .bind(&now)
        .bind(&now)
        .bind(completed_at)
        .bind(created_by)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.get_sprint(&sprint_id).await
    }

    /// Apply a field-level patch.
    ///
    /// The resulting date range is validated against the stored dates. Setting
    /// the status to Active demotes any other Active sprint; setting it to
    /// Completed stamps `completed_at` if it was not already set.
    pub async fn update_sprint(&self, sprint_id: &str, patch: &SprintPatch) -> StorageResult<Sprint> {
        debug!("Updating sprint: {}", sprint_id);

        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyName.into());
            }
        }

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let mut sprint = fetch_sprint(&mut tx, sprint_id)
            .await?
            .ok_or_else(|| StorageError::sprint_not_found(sprint_id))?;

        if patch.is_empty() {
            return Ok(sprint);
        }

        let previous_status = sprint.status;
        patch.apply_to(&mut sprint);
        validate_sprint_dates(sprint.start_date, sprint.end_date)?;

        let now = Utc::now();
        let now_text = encode_timestamp(now);

        if sprint.status == SprintStatus::Active && previous_status != SprintStatus::Active {
            demote_active_sprints(&mut tx, sprint_id, &now_text).await?;
        }
        if sprint.status == SprintStatus::Completed && sprint.completed_at.is_none() {
            sprint.completed_at = Some(now);
        }

        sqlx::query(
            r#"
            UPDATE sprints
            SET name = ?, status = ?, start_date = ?, end_date = ?,
                completed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(sprint.name.trim())
        .bind(sprint.status.as_str())
        .bind(encode_date(sprint.start_date))
        .bind(encode_date(sprint.end_date))
        .bind(sprint.completed_at.map(encode_timestamp))
        .bind(&now_text)
        .bind(sprint_id)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.get_sprint(sprint_id).await
    }

    /// Delete a sprint; its issues return to the backlog in the same transaction
    pub async fn delete_sprint(&self, sprint_id: &str) -> StorageResult<()> {
        debug!("Deleting sprint: {}", sprint_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        sqlx::query("UPDATE issues SET sprint_id = NULL, updated_at = ? WHERE sprint_id = ?")
            .bind(encode_timestamp(Utc::now()))
            .bind(sprint_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        let result = sqlx::query("DELETE FROM sprints WHERE id = ?")
            .bind(sprint_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::sprint_not_found(sprint_id));
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;
        Ok(())
    }

    /// Make a sprint Active, demoting whichever sprint was Active before.
    ///
    /// Starting an already Active sprint is a no-op. A Completed sprint cannot
    /// be restarted.
    pub async fn start_sprint(&self, sprint_id: &str) -> StorageResult<SprintStartResult> {
        debug!("Starting sprint: {}", sprint_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let sprint = fetch_sprint(&mut tx, sprint_id)
            .await?
            .ok_or_else(|| StorageError::sprint_not_found(sprint_id))?;

        match sprint.status {
            SprintStatus::Active => {
                return Ok(SprintStartResult {
                    sprint,
                    demoted: Vec::new(),
                });
            }
            SprintStatus::Completed => {
                return Err(StorageError::Conflict(format!(
                    "Sprint {} is already completed",
                    sprint_id
                )));
            }
            SprintStatus::Planned => {}
        }

        let now = encode_timestamp(Utc::now());
        let demoted_ids = demote_active_sprints(&mut tx, sprint_id, &now).await?;

        sqlx::query("UPDATE sprints SET status = 'Active', updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(sprint_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut demoted = Vec::with_capacity(demoted_ids.len());
        for id in &demoted_ids {
            if let Some(sprint) = fetch_sprint(&mut tx, id).await? {
                demoted.push(sprint);
            }
        }
        let sprint = fetch_sprint(&mut tx, sprint_id)
            .await?
            .ok_or_else(|| StorageError::sprint_not_found(sprint_id))?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!(
            "Sprint {} started, demoted {} sprint(s)",
            sprint_id,
            demoted.len()
        );
        Ok(SprintStartResult { sprint, demoted })
    }

    /// Complete a sprint and return its unfinished issues to the backlog.
    ///
    /// Done issues keep their sprint reference.
    pub async fn end_sprint(&self, sprint_id: &str) -> StorageResult<SprintEndResult> {
        debug!("Ending sprint: {}", sprint_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        if fetch_sprint(&mut tx, sprint_id).await?.is_none() {
            return Err(StorageError::sprint_not_found(sprint_id));
        }

        let now = encode_timestamp(Utc::now());

        let detached_issue_ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM issues WHERE sprint_id = ? AND status != 'Done' ORDER BY id",
        )
        .bind(sprint_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        sqlx::query(
            "UPDATE issues SET sprint_id = NULL, updated_at = ? WHERE sprint_id = ? AND status != 'Done'",
        )
        .bind(&now)
        .bind(sprint_id)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        sqlx::query(
            r#"
            UPDATE sprints
            SET status = 'Completed', completed_at = COALESCE(completed_at, ?), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&now)
        .bind(&now)
        .bind(sprint_id)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        let sprint = fetch_sprint(&mut tx, sprint_id)
            .await?
            .ok_or_else(|| StorageError::sprint_not_found(sprint_id))?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!(
            "Sprint {} completed, {} issue(s) returned to backlog",
            sprint_id,
            detached_issue_ids.len()
        );
        Ok(SprintEndResult {
            sprint,
            detached_issue_ids,
        })
    }
}

async fn fetch_sprint(
    conn: &mut SqliteConnection,
    sprint_id: &str,
) -> StorageResult<Option<Sprint>> {
    let row = sqlx::query("SELECT * FROM sprints WHERE id = ?")
        .bind(sprint_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    row.as_ref().map(row_to_sprint).transpose()
}

/// Set every Active sprint other than `keep_id` back to Planned; returns the demoted ids
async fn demote_active_sprints(
    conn: &mut SqliteConnection,
    keep_id: &str,
    now: &str,
) -> StorageResult<Vec<String>> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT id FROM sprints WHERE status = 'Active' AND id != ?")
            .bind(keep_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(StorageError::Sqlx)?;

    if !ids.is_empty() {
        sqlx::query(
            "UPDATE sprints SET status = 'Planned', updated_at = ? WHERE status = 'Active' AND id != ?",
        )
        .bind(now)
        .bind(keep_id)
        .execute(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

        debug!("Demoted active sprints: {:?}", ids);
    }

    Ok(ids)
}
