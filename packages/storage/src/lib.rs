// ABOUTME: Store of record for Flowcraft backed by SQLite
// ABOUTME: Issue, sprint, and profile persistence, sequential ID assignment, sprint lifecycle

pub mod db;
pub mod error;
pub mod issues;
pub mod profiles;
mod rows;
pub mod sequences;
pub mod sprints;

pub use db::{connect, connect_in_memory, run_migrations};
pub use error::{StorageError, StorageResult};
pub use issues::IssueStorage;
pub use profiles::ProfileStorage;
pub use sprints::SprintStorage;
