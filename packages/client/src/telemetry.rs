// ABOUTME: Capped local event log for diagnostic telemetry
// ABOUTME: Persists the most recent events as a JSON array; writes are best-effort

use chrono::Utc;
use flowcraft_core::metrics::AlertKind;
use flowcraft_core::IssueStatus;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::ClientResult;

/// Number of events kept on disk; older entries are dropped first
pub const MAX_EVENTS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum TelemetryEvent {
    DashboardOpen {
        at: i64,
    },
    AlertClick {
        kind: AlertKind,
        at: i64,
    },
    DndMove {
        from: IssueStatus,
        to: IssueStatus,
        at: i64,
    },
    MyIssuesOpen {
        at: i64,
    },
}

impl TelemetryEvent {
    pub fn dashboard_open() -> Self {
        Self::DashboardOpen { at: now_ms() }
    }

    pub fn alert_click(kind: AlertKind) -> Self {
        Self::AlertClick { kind, at: now_ms() }
    }

    pub fn dnd_move(from: IssueStatus, to: IssueStatus) -> Self {
        Self::DndMove {
            from,
            to,
            at: now_ms(),
        }
    }

    pub fn my_issues_open() -> Self {
        Self::MyIssuesOpen { at: now_ms() }
    }

    /// Milliseconds since the Unix epoch
    pub fn at(&self) -> i64 {
        match self {
            Self::DashboardOpen { at }
            | Self::AlertClick { at, .. }
            | Self::DndMove { at, .. }
            | Self::MyIssuesOpen { at } => *at,
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Handle to the on-disk event log. Clones share one write lock.
#[derive(Clone)]
pub struct EventLog {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Arc<Mutex<()>>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event. Failures are logged and swallowed.
    pub fn log_event(&self, event: TelemetryEvent) {
        if let Err(e) = self.try_append(event) {
            warn!("Failed to record telemetry event: {}", e);
        }
    }

    /// Append an event from async code, running the file I/O on the blocking pool
    pub async fn record(&self, event: TelemetryEvent) {
        let log = self.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || log.log_event(event)).await {
            warn!("Telemetry writer task failed: {}", e);
        }
    }

    fn try_append(&self, event: TelemetryEvent) -> ClientResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut events = self.events();
        events.push(event);
        if events.len() > MAX_EVENTS {
            let excess = events.len() - MAX_EVENTS;
            events.drain(..excess);
        }

        self.write(&events)
    }

    /// Stored events, oldest first. Empty when the file is missing or unreadable.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&content) {
            Ok(events) => events,
            Err(e) => {
                debug!("Ignoring unreadable event log {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    pub fn clear(&self) -> ClientResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, events: &[TelemetryEvent]) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling file first so a crash never leaves a truncated log
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(events)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> EventLog {
        EventLog::new(dir.path().join("events.json"))
    }

    #[test]
    fn test_event_wire_shape() {
        let event = TelemetryEvent::DndMove {
            from: IssueStatus::Todo,
            to: IssueStatus::InProgress,
            at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"t": "dnd_move", "from": "Todo", "to": "In Progress", "at": 1_700_000_000_000i64})
        );

        let click = TelemetryEvent::AlertClick {
            kind: AlertKind::Stale,
            at: 1,
        };
        assert_eq!(
            serde_json::to_value(&click).unwrap(),
            serde_json::json!({"t": "alert_click", "kind": "stale", "at": 1})
        );
    }

    #[test]
    fn test_log_and_read_events() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.log_event(TelemetryEvent::dashboard_open());
        log.log_event(TelemetryEvent::my_issues_open());

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TelemetryEvent::DashboardOpen { .. }));
        assert!(matches!(events[1], TelemetryEvent::MyIssuesOpen { .. }));
    }

    #[test]
    fn test_log_caps_at_max_events() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        for at in 0..(MAX_EVENTS as i64 + 5) {
            log.log_event(TelemetryEvent::DashboardOpen { at });
        }

        let events = log.events();
        assert_eq!(events.len(), MAX_EVENTS);
        assert_eq!(events.first().map(TelemetryEvent::at), Some(5));
        assert_eq!(
            events.last().map(TelemetryEvent::at),
            Some(MAX_EVENTS as i64 + 4)
        );
    }

    #[tokio::test]
    async fn test_record_appends_off_runtime() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        let clone = log.clone();

        log.record(TelemetryEvent::dashboard_open()).await;
        clone.record(TelemetryEvent::my_issues_open()).await;

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], TelemetryEvent::MyIssuesOpen { .. }));
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        fs::write(log.path(), "{not json").unwrap();

        assert!(log.events().is_empty());

        log.log_event(TelemetryEvent::dashboard_open());
        assert_eq!(log.events().len(), 1);
    }

    #[test]
    fn test_clear_removes_events() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.log_event(TelemetryEvent::dashboard_open());
        log.clear().unwrap();
        assert!(log.events().is_empty());

        // Clearing an absent log is fine
        log.clear().unwrap();
    }

    #[test]
    fn test_unwritable_path_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        // Parent is a regular file, so every write fails
        let log = EventLog::new(blocker.join("events.json"));
        log.log_event(TelemetryEvent::dashboard_open());
        assert!(log.events().is_empty());
    }
}
