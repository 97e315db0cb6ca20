// ABOUTME: Sequential identifier assignment for issues and sprints
// ABOUTME: Backed by a counter table so identifiers are never reused after deletion

use flowcraft_core::IdKind;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

const MAX_ID_ATTEMPTS: u32 = 100;

/// Allocate the next identifier of `kind` on the given connection.
///
/// Call inside the transaction that inserts the row so the counter bump and
/// the insert commit together. Values already taken (rows imported with
/// explicit ids) are skipped.
pub async fn next_id(conn: &mut SqliteConnection, kind: IdKind) -> StorageResult<String> {
    let table = match kind {
        IdKind::Issue => "issues",
        IdKind::Sprint => "sprints",
    };
    let exists_query = format!("SELECT COUNT(*) FROM {} WHERE id = ?", table);

    for _ in 0..MAX_ID_ATTEMPTS {
        let value: i64 = sqlx::query_scalar(
            "UPDATE id_sequences SET last_value = last_value + 1 WHERE kind = ? RETURNING last_value",
        )
        .bind(kind.prefix())
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

        let sequence = u32::try_from(value)
            .map_err(|_| StorageError::InvalidData(format!("sequence overflow: {}", value)))?;
        let id = kind.format(sequence);

        let taken: i64 = sqlx::query_scalar(&exists_query)
            .bind(&id)
            .fetch_one(&mut *conn)
            .await
            .map_err(StorageError::Sqlx)?;

        if taken == 0 {
            debug!("Allocated identifier {}", id);
            return Ok(id);
        }

        warn!("Identifier {} already in use, skipping", id);
    }

    Err(StorageError::Conflict(format!(
        "could not allocate a free {} identifier after {} attempts",
        kind.prefix(),
        MAX_ID_ATTEMPTS
    )))
}
