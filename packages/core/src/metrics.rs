// ABOUTME: Sprint aggregates, progress, dashboard alerts, and per-user activity
// ABOUTME: Pure functions over issue and sprint slices used by reports

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::{Issue, IssueStatus, Profile, Sprint, SprintStatus};

/// Issues in progress longer than this without an update are stale
pub const STALE_THRESHOLD_DAYS: i64 = 7;

/// A sprint at or above this completion percentage is on track
pub const ON_TRACK_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintAggregate {
    pub total: usize,
    pub by_status: BTreeMap<IssueStatus, usize>,
    pub done_pct: u8,
}

/// Count issues per status (every status present, zero when empty)
pub fn aggregate_sprint_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> SprintAggregate {
    let mut by_status: BTreeMap<IssueStatus, usize> =
        IssueStatus::ALL.iter().map(|status| (*status, 0)).collect();

    let mut total = 0;
    for issue in issues {
        *by_status.entry(issue.status).or_default() += 1;
        total += 1;
    }

    let done = by_status.get(&IssueStatus::Done).copied().unwrap_or_default();
    SprintAggregate {
        total,
        by_status,
        done_pct: percentage(done, total),
    }
}

/// Completed share of the given issues, 0..=100
pub fn sprint_progress<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> u8 {
    aggregate_sprint_issues(issues).done_pct
}

pub fn is_on_track(progress: u8) -> bool {
    progress >= ON_TRACK_THRESHOLD
}

fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Overdue,
    Unassigned,
    Stale,
}

/// Attention items shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAlerts {
    pub overdue_sprints: Vec<String>,
    pub unassigned_issues: Vec<String>,
    pub stale_issues: Vec<String>,
}

impl DashboardAlerts {
    pub fn compute(issues: &[Issue], sprints: &[Sprint], now: DateTime<Utc>) -> Self {
        let today: NaiveDate = now.date_naive();
        let stale_cutoff = now - Duration::days(STALE_THRESHOLD_DAYS);

        let overdue_sprints = sprints
            .iter()
            .filter(|s| s.status != SprintStatus::Completed && s.end_date < today)
            .map(|s| s.id.clone())
            .collect();

        let unassigned_issues = issues
            .iter()
            .filter(|i| i.assignee_id.is_none())
            .map(|i| i.id.clone())
            .collect();

        let stale_issues = issues
            .iter()
            .filter(|i| i.status == IssueStatus::InProgress && i.updated_at < stale_cutoff)
            .map(|i| i.id.clone())
            .collect();

        Self {
            overdue_sprints,
            unassigned_issues,
            stale_issues,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.overdue_sprints.is_empty()
            && self.unassigned_issues.is_empty()
            && self.stale_issues.is_empty()
    }

    pub fn ids(&self, kind: AlertKind) -> &[String] {
        match kind {
            AlertKind::Overdue => &self.overdue_sprints,
            AlertKind::Unassigned => &self.unassigned_issues,
            AlertKind::Stale => &self.stale_issues,
        }
    }
}

/// Headline counters for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub open_issues: usize,
    pub open_high_priority: usize,
    pub my_open_issues: usize,
    pub active_sprint_done_pct: Option<u8>,
}

impl DashboardSummary {
    pub fn compute(issues: &[Issue], sprints: &[Sprint], user_id: Option<&str>) -> Self {
        let open = || issues.iter().filter(|i| !i.status.is_done());

        let active_sprint_done_pct = sprints.iter().find(|s| s.is_active()).map(|active| {
            sprint_progress(issues.iter().filter(|i| i.in_sprint(&active.id)))
        });

        Self {
            open_issues: open().count(),
            open_high_priority: open().filter(|i| i.priority.is_high()).count(),
            my_open_issues: match user_id {
                Some(user_id) => open()
                    .filter(|i| i.assignee_id.as_deref() == Some(user_id))
                    .count(),
                None => 0,
            },
            active_sprint_done_pct,
        }
    }
}

/// Sprint a report shows by default: the Active one, else the Planned one
/// starting soonest, else the Completed one that ended last
pub fn current_sprint(sprints: &[Sprint]) -> Option<&Sprint> {
    if let Some(active) = sprints.iter().find(|s| s.is_active()) {
        return Some(active);
    }

    let next_planned = sprints
        .iter()
        .filter(|s| s.status == SprintStatus::Planned)
        .min_by_key(|s| s.start_date);
    if next_planned.is_some() {
        return next_planned;
    }

    sprints
        .iter()
        .filter(|s| s.status == SprintStatus::Completed)
        .max_by_key(|s| s.end_date)
}

/// Key of the activity row collecting issues without an assignee
pub const UNASSIGNED_KEY: &str = "unassigned";

/// Workload of one assignee across the given issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub user_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub assigned: usize,
    pub done: usize,
    pub in_progress: usize,
    pub in_review: usize,
    pub todo: usize,
}

impl UserActivity {
    fn new(user_id: &str, profile: Option<&Profile>) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: profile.and_then(|p| p.username.clone()),
            email: profile.and_then(|p| p.email.clone()),
            assigned: 0,
            done: 0,
            in_progress: 0,
            in_review: 0,
            todo: 0,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.user_id == UNASSIGNED_KEY
    }

    pub fn label(&self) -> &str {
        if let Some(username) = self.username.as_deref().filter(|s| !s.is_empty()) {
            return username;
        }
        if let Some(email) = self.email.as_deref().filter(|s| !s.is_empty()) {
            return email;
        }
        if self.is_unassigned() {
            "Unassigned"
        } else {
            &self.user_id
        }
    }

    fn matches(&self, query: &str) -> bool {
        let contains = |value: Option<&str>| {
            value
                .map(|v| v.to_lowercase().contains(query))
                .unwrap_or(false)
        };
        contains(self.username.as_deref())
            || contains(self.email.as_deref())
            || contains(Some(self.user_id.as_str()))
    }
}

/// Per-assignee counts, most completed first.
///
/// `query` keeps rows whose username, email, or id contains it
/// (case-insensitive); a blank query keeps every row.
pub fn user_activity(issues: &[Issue], profiles: &[Profile], query: &str) -> Vec<UserActivity> {
    let mut rows: Vec<UserActivity> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for issue in issues {
        let user_id = issue.assignee_id.as_deref().unwrap_or(UNASSIGNED_KEY);
        let slot = *index.entry(user_id).or_insert_with(|| {
            let profile = profiles.iter().find(|p| p.id == user_id);
            rows.push(UserActivity::new(user_id, profile));
            rows.len() - 1
        });

        let row = &mut rows[slot];
        row.assigned += 1;
        match issue.status {
            IssueStatus::Done => row.done += 1,
            IssueStatus::InProgress => row.in_progress += 1,
            IssueStatus::InReview => row.in_review += 1,
            IssueStatus::Todo => row.todo += 1,
            _ => {}
        }
    }

    let query = query.trim().to_lowercase();
    if !query.is_empty() {
        rows.retain(|row| row.matches(&query));
    }

    // Stable, so ties keep first-seen order
    rows.sort_by(|a, b| b.done.cmp(&a.done));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssueType, Priority};
    use chrono::TimeZone;

    fn issue(id: &str, status: IssueStatus) -> Issue {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Issue {
            id: id.to_string(),
            title: format!("Issue {}", id),
            issue_type: IssueType::Task,
            status,
            priority: Priority::P2,
            sprint_id: None,
            assignee_id: None,
            parent_id: None,
            description: String::new(),
            created_at: ts,
            updated_at: ts,
            created_by: None,
        }
    }

    fn sprint(id: &str, status: SprintStatus, end: NaiveDate) -> Sprint {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Sprint {
            id: id.to_string(),
            name: id.to_string(),
            status,
            start_date: end - Duration::days(14),
            end_date: end,
            created_at: ts,
            updated_at: ts,
            completed_at: None,
            created_by: None,
        }
    }

    #[test]
    fn test_aggregate_counts_every_status() {
        let issues = vec![
            issue("TSK-001", IssueStatus::Todo),
            issue("TSK-002", IssueStatus::Done),
            issue("TSK-003", IssueStatus::Done),
        ];
        let agg = aggregate_sprint_issues(&issues);
        assert_eq!(agg.total, 3);
        assert_eq!(agg.by_status.len(), IssueStatus::ALL.len());
        assert_eq!(agg.by_status[&IssueStatus::Done], 2);
        assert_eq!(agg.by_status[&IssueStatus::InReview], 0);
        assert_eq!(agg.done_pct, 67);
    }

    #[test]
    fn test_progress_of_empty_sprint_is_zero() {
        let issues: Vec<Issue> = Vec::new();
        assert_eq!(sprint_progress(&issues), 0);
    }

    #[test]
    fn test_on_track_threshold() {
        assert!(is_on_track(80));
        assert!(!is_on_track(79));
    }

    #[test]
    fn test_dashboard_alerts() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut stale = issue("TSK-001", IssueStatus::InProgress);
        stale.assignee_id = Some("user-1".to_string());
        let mut fresh = issue("TSK-002", IssueStatus::InProgress);
        fresh.assignee_id = Some("user-1".to_string());
        fresh.updated_at = now - Duration::days(1);
        let unassigned = issue("TSK-003", IssueStatus::Todo);

        let sprints = vec![
            sprint("SPR-001", SprintStatus::Active, NaiveDate::from_ymd_opt(2025, 2, 20).unwrap()),
            sprint("SPR-002", SprintStatus::Completed, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
            sprint("SPR-003", SprintStatus::Planned, NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()),
        ];

        let alerts = DashboardAlerts::compute(&[stale, fresh, unassigned], &sprints, now);
        assert_eq!(alerts.overdue_sprints, vec!["SPR-001".to_string()]);
        assert_eq!(alerts.unassigned_issues, vec!["TSK-003".to_string()]);
        assert_eq!(alerts.ids(AlertKind::Stale), &["TSK-001".to_string()]);
        assert!(!alerts.is_empty());
    }

    #[test]
    fn test_dashboard_summary() {
        let mut high = issue("TSK-001", IssueStatus::InProgress);
        high.priority = Priority::P0;
        high.assignee_id = Some("me".to_string());
        high.sprint_id = Some("SPR-001".to_string());
        let mut done = issue("TSK-002", IssueStatus::Done);
        done.sprint_id = Some("SPR-001".to_string());
        let other = issue("TSK-003", IssueStatus::Todo);

        let sprints = vec![sprint(
            "SPR-001",
            SprintStatus::Active,
            NaiveDate::from_ymd_opt(2025, 2, 20).unwrap(),
        )];

        let summary = DashboardSummary::compute(&[high, done, other], &sprints, Some("me"));
        assert_eq!(summary.open_issues, 2);
        assert_eq!(summary.open_high_priority, 1);
        assert_eq!(summary.my_open_issues, 1);
        assert_eq!(summary.active_sprint_done_pct, Some(50));
    }

    fn assigned(id: &str, status: IssueStatus, user: Option<&str>) -> Issue {
        let mut issue = issue(id, status);
        issue.assignee_id = user.map(String::from);
        issue
    }

    fn profile(id: &str, username: Option<&str>, email: Option<&str>) -> Profile {
        Profile {
            id: id.to_string(),
            username: username.map(String::from),
            email: email.map(String::from),
        }
    }

    #[test]
    fn test_current_sprint_prefers_active() {
        let end = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
        let sprints = vec![
            sprint("SPR-001", SprintStatus::Planned, end),
            sprint("SPR-002", SprintStatus::Active, end),
        ];
        assert_eq!(current_sprint(&sprints).map(|s| s.id.as_str()), Some("SPR-002"));
    }

    #[test]
    fn test_current_sprint_falls_back_to_next_planned_then_last_completed() {
        let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();
        let mut sprints = vec![
            sprint("SPR-001", SprintStatus::Completed, date(1, 15)),
            sprint("SPR-002", SprintStatus::Completed, date(2, 1)),
            sprint("SPR-003", SprintStatus::Planned, date(4, 1)),
            sprint("SPR-004", SprintStatus::Planned, date(3, 15)),
        ];
        assert_eq!(current_sprint(&sprints).map(|s| s.id.as_str()), Some("SPR-004"));

        sprints.retain(|s| s.status == SprintStatus::Completed);
        assert_eq!(current_sprint(&sprints).map(|s| s.id.as_str()), Some("SPR-002"));

        assert!(current_sprint(&[]).is_none());
    }

    #[test]
    fn test_user_activity_counts_and_sorts_by_done() {
        let issues = vec![
            assigned("TSK-001", IssueStatus::Todo, Some("u1")),
            assigned("TSK-002", IssueStatus::InProgress, Some("u1")),
            assigned("TSK-003", IssueStatus::Done, Some("u2")),
            assigned("TSK-004", IssueStatus::Done, Some("u2")),
            assigned("TSK-005", IssueStatus::InReview, None),
            assigned("TSK-006", IssueStatus::ReadyToTest, Some("u1")),
        ];
        let profiles = vec![profile("u2", Some("bob"), Some("bob@example.com"))];

        let rows = user_activity(&issues, &profiles, "");
        let order: Vec<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["u2", "u1", UNASSIGNED_KEY]);

        assert_eq!(rows[0].label(), "bob");
        assert_eq!(rows[0].done, 2);

        let u1 = &rows[1];
        assert_eq!(u1.label(), "u1");
        assert_eq!(
            (u1.assigned, u1.done, u1.in_progress, u1.in_review, u1.todo),
            (3, 0, 1, 0, 1)
        );

        assert!(rows[2].is_unassigned());
        assert_eq!(rows[2].label(), "Unassigned");
        assert_eq!(rows[2].in_review, 1);
    }

    #[test]
    fn test_user_activity_query_matches_name_email_or_id() {
        let issues = vec![
            assigned("TSK-001", IssueStatus::Todo, Some("u1")),
            assigned("TSK-002", IssueStatus::Todo, Some("u2")),
            assigned("TSK-003", IssueStatus::Todo, None),
        ];
        let profiles = vec![
            profile("u1", Some("alice"), None),
            profile("u2", None, Some("bob@example.com")),
        ];

        let ids = |query: &str| -> Vec<String> {
            user_activity(&issues, &profiles, query)
                .into_iter()
                .map(|r| r.user_id)
                .collect()
        };
        assert_eq!(ids("ALICE"), vec!["u1".to_string()]);
        assert_eq!(ids("example.com"), vec!["u2".to_string()]);
        assert_eq!(ids("unassig"), vec![UNASSIGNED_KEY.to_string()]);
        assert_eq!(ids("   ").len(), 3);
        assert!(ids("carol").is_empty());
    }
}
