// ABOUTME: Issue and sprint type definitions
// ABOUTME: Closed enumerations validated once at the boundary, plus create/patch inputs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

/// Workflow status of an issue, in board column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueStatus {
    #[serde(rename = "Todo")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Ready For Review")]
    ReadyForReview,
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "Ready To Test")]
    ReadyToTest,
    #[serde(rename = "Done")]
    Done,
}

impl IssueStatus {
    /// All statuses in board order
    pub const ALL: [IssueStatus; 6] = [
        IssueStatus::Todo,
        IssueStatus::InProgress,
        IssueStatus::ReadyForReview,
        IssueStatus::InReview,
        IssueStatus::ReadyToTest,
        IssueStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Todo => "Todo",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::ReadyForReview => "Ready For Review",
            IssueStatus::InReview => "In Review",
            IssueStatus::ReadyToTest => "Ready To Test",
            IssueStatus::Done => "Done",
        }
    }

    /// Droppable column identifier on the board
    pub fn column_id(&self) -> &'static str {
        match self {
            IssueStatus::Todo => "TODO",
            IssueStatus::InProgress => "IN_PROGRESS",
            IssueStatus::ReadyForReview => "READY_FOR_REVIEW",
            IssueStatus::InReview => "IN_REVIEW",
            IssueStatus::ReadyToTest => "READY_TO_TEST",
            IssueStatus::Done => "DONE",
        }
    }

    /// Resolve a drop target column. Unknown columns are invalid drops.
    pub fn from_column_id(column_id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.column_id() == column_id)
    }

    fn position(&self) -> usize {
        Self::ALL
            .iter()
            .position(|status| status == self)
            .unwrap_or_default()
    }

    /// Move one column right, clamping at Done
    pub fn next(self) -> Self {
        let index = (self.position() + 1).min(Self::ALL.len() - 1);
        Self::ALL[index]
    }

    /// Move one column left, clamping at Todo
    pub fn prev(self) -> Self {
        Self::ALL[self.position().saturating_sub(1)]
    }

    pub fn is_done(&self) -> bool {
        matches!(self, IssueStatus::Done)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_enum("status", s))
    }
}

/// Issue priority. Lower number is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
    P4,
    P5,
}

impl Priority {
    pub const ALL: [Priority; 6] = [
        Priority::P0,
        Priority::P1,
        Priority::P2,
        Priority::P3,
        Priority::P4,
        Priority::P5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::P4 => "P4",
            Priority::P5 => "P5",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::P0 => "P0 - Critical",
            Priority::P1 => "P1 - High",
            Priority::P2 => "P2 - Medium",
            Priority::P3 => "P3 - Low",
            Priority::P4 => "P4 - Very Low",
            Priority::P5 => "P5 - Lowest",
        }
    }

    /// Map a legacy named priority (Low/Medium/High/Critical) onto the numeric scale.
    pub fn from_legacy_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "critical" => Some(Priority::P0),
            "high" => Some(Priority::P1),
            "medium" => Some(Priority::P2),
            "low" => Some(Priority::P3),
            _ => None,
        }
    }

    /// P0 and P1 count as high priority on the dashboard
    pub fn is_high(&self) -> bool {
        matches!(self, Priority::P0 | Priority::P1)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::P2
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_enum("priority", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    Bug,
    Task,
    Feature,
    Story,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Bug => "Bug",
            IssueType::Task => "Task",
            IssueType::Feature => "Feature",
            IssueType::Story => "Story",
        }
    }
}

impl Default for IssueType {
    fn default() -> Self {
        IssueType::Task
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bug" => Ok(IssueType::Bug),
            "Task" => Ok(IssueType::Task),
            "Feature" => Ok(IssueType::Feature),
            "Story" => Ok(IssueType::Story),
            other => Err(ValidationError::invalid_enum("issue type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SprintStatus {
    Planned,
    Active,
    Completed,
}

impl SprintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprintStatus::Planned => "Planned",
            SprintStatus::Active => "Active",
            SprintStatus::Completed => "Completed",
        }
    }
}

impl Default for SprintStatus {
    fn default() -> Self {
        SprintStatus::Planned
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SprintStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Planned" => Ok(SprintStatus::Planned),
            "Active" => Ok(SprintStatus::Active),
            "Completed" => Ok(SprintStatus::Completed),
            other => Err(ValidationError::invalid_enum("sprint status", other)),
        }
    }
}

/// Reference to a user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            email: None,
        }
    }
}

/// Directory entry naming a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Profile {
    /// Username, then email, then the raw id
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(self.id.as_str())
    }
}

/// Display name for an assignee id: the profile's name, the raw id when
/// no profile is known, and "Unassigned" for no assignee
pub fn assignee_name(profiles: &[Profile], assignee_id: Option<&str>) -> String {
    match assignee_id {
        None => "Unassigned".to_string(),
        Some(id) => profiles
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.display_name().to_string())
            .unwrap_or_else(|| id.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub status: IssueStatus,
    pub priority: Priority,
    #[serde(default)]
    pub sprint_id: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserRef>,
}

impl Issue {
    /// Issues without a sprint live in the backlog
    pub fn in_backlog(&self) -> bool {
        self.sprint_id.is_none()
    }

    pub fn in_sprint(&self, sprint_id: &str) -> bool {
        self.sprint_id.as_deref() == Some(sprint_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub status: SprintStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserRef>,
}

impl Sprint {
    pub fn is_active(&self) -> bool {
        self.status == SprintStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreateInput {
    pub title: String,
    #[serde(rename = "type", default)]
    pub issue_type: IssueType,
    #[serde(default = "default_issue_status")]
    pub status: IssueStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub sprint_id: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl IssueCreateInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            issue_type: IssueType::default(),
            status: IssueStatus::Todo,
            priority: Priority::default(),
            sprint_id: None,
            assignee_id: None,
            parent_id: None,
            description: String::new(),
        }
    }
}

fn default_issue_status() -> IssueStatus {
    IssueStatus::Todo
}

/// Field-level patch for an issue.
///
/// Nullable references use `Option<Option<_>>`: absent leaves the field alone,
/// `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub sprint_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        self == &IssuePatch::default()
    }

    /// Apply the patch to a cached copy of the issue
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(title) = &self.title {
            issue.title = title.clone();
        }
        if let Some(issue_type) = self.issue_type {
            issue.issue_type = issue_type;
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
        if let Some(sprint_id) = &self.sprint_id {
            issue.sprint_id = sprint_id.clone();
        }
        if let Some(assignee_id) = &self.assignee_id {
            issue.assignee_id = assignee_id.clone();
        }
        if let Some(parent_id) = &self.parent_id {
            issue.parent_id = parent_id.clone();
        }
        if let Some(description) = &self.description {
            issue.description = description.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintCreateInput {
    pub name: String,
    #[serde(default)]
    pub status: SprintStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SprintStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl SprintPatch {
    pub fn is_empty(&self) -> bool {
        self == &SprintPatch::default()
    }

    pub fn apply_to(&self, sprint: &mut Sprint) {
        if let Some(name) = &self.name {
            sprint.name = name.clone();
        }
        if let Some(status) = self.status {
            sprint.status = status;
        }
        if let Some(start_date) = self.start_date {
            sprint.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            sprint.end_date = end_date;
        }
    }
}

fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_wire_literals() {
        let json = serde_json::to_string(&IssueStatus::ReadyForReview).unwrap();
        assert_eq!(json, "\"Ready For Review\"");

        let parsed: IssueStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, IssueStatus::InProgress);

        assert!(serde_json::from_str::<IssueStatus>("\"Blocked\"").is_err());
    }

    #[test]
    fn test_status_next_prev_clamp() {
        assert_eq!(IssueStatus::Todo.prev(), IssueStatus::Todo);
        assert_eq!(IssueStatus::Todo.next(), IssueStatus::InProgress);
        assert_eq!(IssueStatus::ReadyToTest.next(), IssueStatus::Done);
        assert_eq!(IssueStatus::Done.next(), IssueStatus::Done);
        assert_eq!(IssueStatus::Done.prev(), IssueStatus::ReadyToTest);
    }

    #[test]
    fn test_column_ids() {
        for status in IssueStatus::ALL {
            assert_eq!(IssueStatus::from_column_id(status.column_id()), Some(status));
        }
        assert_eq!(IssueStatus::from_column_id("BACKLOG"), None);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Done".parse::<IssueStatus>().unwrap(), IssueStatus::Done);
        assert!("done".parse::<IssueStatus>().is_err());
    }

    #[test]
    fn test_legacy_priority_mapping() {
        assert_eq!(Priority::from_legacy_name("Critical"), Some(Priority::P0));
        assert_eq!(Priority::from_legacy_name("High"), Some(Priority::P1));
        assert_eq!(Priority::from_legacy_name("medium"), Some(Priority::P2));
        assert_eq!(Priority::from_legacy_name("Low"), Some(Priority::P3));
        assert_eq!(Priority::from_legacy_name("Urgent"), None);
        assert!(Priority::P1.is_high());
        assert!(!Priority::P2.is_high());
    }

    #[test]
    fn test_issue_patch_distinguishes_null_from_absent() {
        let patch: IssuePatch = serde_json::from_str(r#"{"sprintId": null}"#).unwrap();
        assert_eq!(patch.sprint_id, Some(None));
        assert_eq!(patch.assignee_id, None);

        let patch: IssuePatch = serde_json::from_str(r#"{"assigneeId": "user-1"}"#).unwrap();
        assert_eq!(patch.assignee_id, Some(Some("user-1".to_string())));

        let empty: IssuePatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_issue_patch_serializes_clear_as_null() {
        let patch = IssuePatch {
            sprint_id: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"sprintId":null}"#);
    }

    #[test]
    fn test_issue_create_defaults() {
        let input: IssueCreateInput = serde_json::from_str(r#"{"title": "Fix login"}"#).unwrap();
        assert_eq!(input.status, IssueStatus::Todo);
        assert_eq!(input.priority, Priority::P2);
        assert_eq!(input.issue_type, IssueType::Task);
        assert_eq!(input.description, "");
    }

    #[test]
    fn test_profile_display_name_falls_back() {
        let mut profile = Profile {
            id: "user-1".to_string(),
            username: Some("alice".to_string()),
            email: Some("alice@example.com".to_string()),
        };
        assert_eq!(profile.display_name(), "alice");

        profile.username = Some(String::new());
        assert_eq!(profile.display_name(), "alice@example.com");

        profile.email = None;
        assert_eq!(profile.display_name(), "user-1");
    }

    #[test]
    fn test_assignee_name_resolves_through_profiles() {
        let profiles = vec![Profile {
            id: "user-1".to_string(),
            username: Some("alice".to_string()),
            email: None,
        }];
        assert_eq!(assignee_name(&profiles, Some("user-1")), "alice");
        assert_eq!(assignee_name(&profiles, Some("user-9")), "user-9");
        assert_eq!(assignee_name(&profiles, None), "Unassigned");
    }
}
