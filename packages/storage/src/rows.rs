// ABOUTME: Row mapping between SQLite columns and core types
// ABOUTME: Timestamps are RFC 3339 text, dates are ISO calendar dates, enums are their wire literals

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use flowcraft_core::{Issue, Sprint, UserRef};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{StorageError, StorageResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn decode_timestamp(raw: &str, column: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidData(format!("{}: '{}' ({})", column, raw, e)))
}

fn decode_date(raw: &str, column: &str) -> StorageResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| StorageError::InvalidData(format!("{}: '{}' ({})", column, raw, e)))
}

fn decode_enum<T>(raw: &str, column: &str) -> StorageResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|e| StorageError::InvalidData(format!("{}: {}", column, e)))
}

fn optional_timestamp(row: &SqliteRow, column: &str) -> StorageResult<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| decode_timestamp(&raw, column)).transpose()
}

fn timestamp(row: &SqliteRow, column: &str) -> StorageResult<DateTime<Utc>> {
    let raw: String = row.try_get(column)?;
    decode_timestamp(&raw, column)
}

fn created_by(row: &SqliteRow) -> StorageResult<Option<UserRef>> {
    let user_id: Option<String> = row.try_get("created_by")?;
    Ok(user_id.map(UserRef::new))
}

pub(crate) fn row_to_issue(row: &SqliteRow) -> StorageResult<Issue> {
    let issue_type: String = row.try_get("type")?;
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;

    Ok(Issue {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        issue_type: decode_enum(&issue_type, "type")?,
        status: decode_enum(&status, "status")?,
        priority: decode_enum(&priority, "priority")?,
        sprint_id: row.try_get("sprint_id")?,
        assignee_id: row.try_get("assignee_id")?,
        parent_id: row.try_get("parent_id")?,
        description: row.try_get("description")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
        created_by: created_by(row)?,
    })
}

pub(crate) fn row_to_sprint(row: &SqliteRow) -> StorageResult<Sprint> {
    let status: String = row.try_get("status")?;
    let start_date: String = row.try_get("start_date")?;
    let end_date: String = row.try_get("end_date")?;

    Ok(Sprint {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        status: decode_enum(&status, "status")?,
        start_date: decode_date(&start_date, "start_date")?,
        end_date: decode_date(&end_date, "end_date")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
        completed_at: optional_timestamp(row, "completed_at")?,
        created_by: created_by(row)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_encoding_is_sortable_utc() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let encoded = encode_timestamp(ts);
        assert_eq!(encoded, "2025-01-01T00:00:00.000000Z");
        assert_eq!(decode_timestamp(&encoded, "created_at").unwrap(), ts);
    }

    #[test]
    fn test_bad_stored_values_are_invalid_data() {
        assert!(matches!(
            decode_timestamp("yesterday", "updated_at"),
            Err(StorageError::InvalidData(_))
        ));
        assert!(matches!(
            decode_date("2025-13-01", "start_date"),
            Err(StorageError::InvalidData(_))
        ));
        assert!(matches!(
            decode_enum::<flowcraft_core::IssueStatus>("Blocked", "status"),
            Err(StorageError::InvalidData(_))
        ));
    }
}
