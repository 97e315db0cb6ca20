use chrono::{DateTime, Local, TimeZone, Utc};
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use flowcraft_core::{IssueStatus, Priority};

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_millis(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(ts) => format_timestamp(&ts),
        None => ms.to_string(),
    }
}

pub fn colored_status(status: IssueStatus) -> ColoredString {
    match status {
        IssueStatus::Todo => status.as_str().normal(),
        IssueStatus::InProgress => status.as_str().cyan(),
        IssueStatus::ReadyForReview | IssueStatus::InReview => status.as_str().magenta(),
        IssueStatus::ReadyToTest => status.as_str().yellow(),
        IssueStatus::Done => status.as_str().green(),
    }
}

pub fn colored_priority(priority: Priority) -> ColoredString {
    if priority.is_high() {
        priority.as_str().red().bold()
    } else {
        priority.as_str().normal()
    }
}

/// Accept display names ("In Progress") and column ids ("IN_PROGRESS", any case)
pub fn parse_status(s: &str) -> Result<IssueStatus, String> {
    s.parse::<IssueStatus>()
        .ok()
        .or_else(|| IssueStatus::from_column_id(&s.to_uppercase()))
        .ok_or_else(|| {
            let valid: Vec<&str> = IssueStatus::ALL.iter().map(IssueStatus::as_str).collect();
            format!("unknown status '{}' (expected one of: {})", s, valid.join(", "))
        })
}
