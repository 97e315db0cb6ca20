// ABOUTME: Issue storage layer using SQLite
// ABOUTME: CRUD, status writes, and bulk sprint assignment for issues

use chrono::Utc;
use flowcraft_core::{
    validate_issue_create, validate_issue_patch, IdKind, Issue, IssueCreateInput, IssuePatch,
    IssueStatus,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::rows::{encode_timestamp, row_to_issue};
use crate::sequences::next_id;

pub struct IssueStorage {
    pool: SqlitePool,
}

impl IssueStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every issue, newest first
    pub async fn list_issues(&self) -> StorageResult<Vec<Issue>> {
        debug!("Fetching all issues");

        let rows = sqlx::query("SELECT * FROM issues ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_issue).collect()
    }

    pub async fn list_issues_in_sprint(&self, sprint_id: &str) -> StorageResult<Vec<Issue>> {
        debug!("Fetching issues for sprint: {}", sprint_id);

        let rows = sqlx::query(
            "SELECT * FROM issues WHERE sprint_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(sprint_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_issue).collect()
    }

    pub async fn find_issue(&self, issue_id: &str) -> StorageResult<Option<Issue>> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        fetch_issue(&mut conn, issue_id).await
    }

    pub async fn get_issue(&self, issue_id: &str) -> StorageResult<Issue> {
        debug!("Fetching issue: {}", issue_id);

        self.find_issue(issue_id)
            .await?
            .ok_or_else(|| StorageError::issue_not_found(issue_id))
    }

    pub async fn create_issue(
        &self,
        input: &IssueCreateInput,
        created_by: Option<&str>,
    ) -> StorageResult<Issue> {
        validate_issue_create(input)?;
        debug!("Creating issue: {}", input.title);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        if let Some(sprint_id) = &input.sprint_id {
            ensure_sprint_exists(&mut tx, sprint_id).await?;
        }
        if let Some(parent_id) = &input.parent_id {
            ensure_issue_exists(&mut tx, parent_id).await?;
        }

        let issue_id = next_id(&mut tx, IdKind::Issue).await?;
        let now = encode_timestamp(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO issues (
                id, title, type, status, priority, sprint_id, assignee_id,
                parent_id, description, created_at, updated_at, created_by
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&issue_id)
        .bind(input.title.trim())
        .bind(input.issue_type.as_str())
        .bind(input.status.as_str())
        .bind(input.priority.as_str())
        .bind(&input.sprint_id)
        .bind(&input.assignee_id)
        .bind(&input.parent_id)
        .bind(&input.description)
        .bind(&now)
        .bind(&now)
        .bind(created_by)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.get_issue(&issue_id).await
    }

    /// Apply a field-level patch. An empty patch returns the stored issue untouched.
    pub async fn update_issue(&self, issue_id: &str, patch: &IssuePatch) -> StorageResult<Issue> {
        validate_issue_patch(issue_id, patch)?;
        debug!("Updating issue: {}", issue_id);

        if patch.is_empty() {
            return self.get_issue(issue_id).await;
        }

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        if fetch_issue(&mut tx, issue_id).await?.is_none() {
            return Err(StorageError::issue_not_found(issue_id));
        }
        if let Some(Some(sprint_id)) = &patch.sprint_id {
            ensure_sprint_exists(&mut tx, sprint_id).await?;
        }
        if let Some(Some(parent_id)) = &patch.parent_id {
            ensure_issue_exists(&mut tx, parent_id).await?;
        }

        // Build dynamic update query
        let mut query = String::from("UPDATE issues SET updated_at = ?");

        if patch.title.is_some() {
            query.push_str(", title = ?");
        }
        if patch.issue_type.is_some() {
            query.push_str(", type = ?");
        }
        if patch.status.is_some() {
            query.push_str(", status = ?");
        }
        if patch.priority.is_some() {
            query.push_str(", priority = ?");
        }
        if patch.sprint_id.is_some() {
            query.push_str(", sprint_id = ?");
        }
        if patch.assignee_id.is_some() {
            query.push_str(", assignee_id = ?");
        }
        if patch.parent_id.is_some() {
            query.push_str(", parent_id = ?");
        }
        if patch.description.is_some() {
            query.push_str(", description = ?");
        }

        query.push_str(" WHERE id = ?");

        let mut q = sqlx::query(&query).bind(encode_timestamp(Utc::now()));

        if let Some(title) = &patch.title {
            q = q.bind(title.trim().to_string());
        }
        if let Some(issue_type) = patch.issue_type {
            q = q.bind(issue_type.as_str());
        }
        if let Some(status) = patch.status {
            q = q.bind(status.as_str());
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority.as_str());
        }
        if let Some(sprint_id) = &patch.sprint_id {
            q = q.bind(sprint_id.clone());
        }
        if let Some(assignee_id) = &patch.assignee_id {
            q = q.bind(assignee_id.clone());
        }
        if let Some(parent_id) = &patch.parent_id {
            q = q.bind(parent_id.clone());
        }
        if let Some(description) = &patch.description {
            q = q.bind(description.clone());
        }

        q = q.bind(issue_id);

        q.execute(&mut *tx).await.map_err(StorageError::Sqlx)?;
        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.get_issue(issue_id).await
    }

    /// Persist a status transition and return the stored record
    pub async fn update_issue_status(
        &self,
        issue_id: &str,
        status: IssueStatus,
    ) -> StorageResult<Issue> {
        debug!("Updating status of issue {} to {}", issue_id, status);

        let result = sqlx::query("UPDATE issues SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(encode_timestamp(Utc::now()))
            .bind(issue_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::issue_not_found(issue_id));
        }

        self.get_issue(issue_id).await
    }

    pub async fn delete_issue(&self, issue_id: &str) -> StorageResult<()> {
        debug!("Deleting issue: {}", issue_id);

        let result = sqlx::query("DELETE FROM issues WHERE id = ?")
            .bind(issue_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::issue_not_found(issue_id));
        }

        Ok(())
    }

    /// Move several issues into a sprint (or back to the backlog with `None`).
    ///
    /// All-or-nothing: an unknown issue aborts the whole assignment.
    pub async fn bulk_assign(
        &self,
        issue_ids: &[String],
        sprint_id: Option<&str>,
    ) -> StorageResult<Vec<Issue>> {
        debug!(
            "Assigning {} issues to sprint {:?}",
            issue_ids.len(),
            sprint_id
        );

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        if let Some(sprint_id) = sprint_id {
            ensure_sprint_exists(&mut tx, sprint_id).await?;
        }

        let now = encode_timestamp(Utc::now());
        let mut updated = Vec::with_capacity(issue_ids.len());

        for issue_id in issue_ids {
            let result =
                sqlx::query("UPDATE issues SET sprint_id = ?, updated_at = ? WHERE id = ?")
                    .bind(sprint_id)
                    .bind(&now)
                    .bind(issue_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::Sqlx)?;

            if result.rows_affected() == 0 {
                return Err(StorageError::issue_not_found(issue_id.as_str()));
            }

            if let Some(issue) = fetch_issue(&mut tx, issue_id).await? {
                updated.push(issue);
            }
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(updated)
    }
}

pub(crate) async fn fetch_issue(
    conn: &mut SqliteConnection,
    issue_id: &str,
) -> StorageResult<Option<Issue>> {
    let row = sqlx::query("SELECT * FROM issues WHERE id = ?")
        .bind(issue_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    row.as_ref().map(row_to_issue).transpose()
}

async fn ensure_issue_exists(conn: &mut SqliteConnection, issue_id: &str) -> StorageResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE id = ?")
        .bind(issue_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    if count == 0 {
        return Err(StorageError::InvalidReference {
            entity: "issue",
            id: issue_id.to_string(),
        });
    }
    Ok(())
}

async fn ensure_sprint_exists(conn: &mut SqliteConnection, sprint_id: &str) -> StorageResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sprints WHERE id = ?")
        .bind(sprint_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    if count == 0 {
        return Err(StorageError::InvalidReference {
            entity: "sprint",
            id: sprint_id.to_string(),
        });
    }
    Ok(())
}
