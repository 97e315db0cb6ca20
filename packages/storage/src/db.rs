// ABOUTME: Database connection management and migrations
// ABOUTME: Opens the SQLite pool with WAL and foreign keys, then applies embedded migrations

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Open (creating if needed) the database file and run migrations
pub async fn connect(database_path: &Path) -> StorageResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = database_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let database_url = format!("sqlite:{}", database_path.display());
    debug!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    // Configure connection pool
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    info!("Database connection established");

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database, used by tests and ephemeral servers.
///
/// Every SQLite `:memory:` connection is a separate database, so the pool is
/// capped at one connection.
pub async fn connect_in_memory() -> StorageResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(StorageError::Migration)?;

    debug!("Database migrations completed");
    Ok(())
}
