use std::env;
use std::path::PathBuf;

/// Get the path to the Flowcraft directory (~/.flowcraft)
pub fn flowcraft_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".flowcraft")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".flowcraft")
    }
}

/// Get the path to the SQLite store of record (~/.flowcraft/flowcraft.db)
pub fn database_file() -> PathBuf {
    flowcraft_dir().join("flowcraft.db")
}

/// Get the path to the local diagnostic event log (~/.flowcraft/events.json)
pub fn events_file() -> PathBuf {
    flowcraft_dir().join("events.json")
}
