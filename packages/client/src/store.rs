// ABOUTME: Application state: cached issues and sprints plus every mutation entry point
// ABOUTME: Hosts the optimistic status mutator with per-issue supersede and rollback tracking

use chrono::{DateTime, Utc};
use flowcraft_core::metrics::current_sprint;
use flowcraft_core::{
    assignee_name, validate_issue_create, validate_issue_patch, validate_sprint_create,
    validate_sprint_dates, BulkAssignRequest, Issue, IssueCreateInput, IssuePatch, IssueStatus,
    Profile, Sprint, SprintCreateInput, SprintEndResult, SprintPatch, SprintStartResult,
    SprintStatus, UpdateIssueStatusRequest,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::remote::Remote;
use crate::telemetry::{EventLog, TelemetryEvent};

/// Lifecycle of the most recent status mutation on one issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Applying,
    Confirmed,
    RolledBack,
}

/// What a mutator call resolved to when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// This call was the latest for the issue; the server's record is now cached
    Confirmed(Issue),
    /// A newer mutation on the same issue was issued before this one settled
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StatusSnapshot {
    status: IssueStatus,
    updated_at: DateTime<Utc>,
}

impl StatusSnapshot {
    fn of(issue: &Issue) -> Self {
        Self {
            status: issue.status,
            updated_at: issue.updated_at,
        }
    }

    fn restore(&self, issue: &mut Issue) {
        issue.status = self.status;
        issue.updated_at = self.updated_at;
    }
}

#[derive(Debug, Clone)]
struct MutationSlot {
    seq: u64,
    phase: MutationPhase,
    /// Last server-confirmed status; rollback target
    base: StatusSnapshot,
}

/// How a dispatched mutation ended
enum Settlement {
    Succeeded(Issue),
    Failed(String),
    Cancelled,
}

/// Where a settled mutation stood relative to its issue's slot
#[derive(Debug, PartialEq, Eq)]
enum Settled {
    /// Still the latest move; its result decides the visible state
    Latest,
    /// A newer move was issued in the meantime
    Stale,
    /// The issue was deleted while the move was in flight
    Orphaned,
}

#[derive(Default)]
struct StoreState {
    issues: Vec<Issue>,
    sprints: Vec<Sprint>,
    profiles: Vec<Profile>,
    mutations: HashMap<String, MutationSlot>,
    next_seq: u64,
    last_error: Option<String>,
}

impl StoreState {
    fn upsert_issue(&mut self, issue: Issue) {
        match self.issues.iter_mut().find(|i| i.id == issue.id) {
            Some(existing) => *existing = issue,
            None => self.issues.insert(0, issue),
        }
    }

    fn upsert_sprint(&mut self, sprint: Sprint) {
        if sprint.is_active() {
            self.demote_active_except(&sprint.id);
        }
        match self.sprints.iter_mut().find(|s| s.id == sprint.id) {
            Some(existing) => *existing = sprint,
            None => self.sprints.insert(0, sprint),
        }
    }

    fn demote_active_except(&mut self, sprint_id: &str) {
        for sprint in self.sprints.iter_mut() {
            if sprint.id != sprint_id && sprint.is_active() {
                sprint.status = SprintStatus::Planned;
            }
        }
    }

    fn detach_issues(&mut self, issue_ids: &[String]) {
        for issue in self.issues.iter_mut() {
            if issue_ids.contains(&issue.id) {
                issue.sprint_id = None;
            }
        }
    }
}

/// Explicit application state shared by every view.
///
/// The lock is never held across an `.await`, so each state transition is a
/// short critical section.
pub struct AppStore {
    remote: Arc<dyn Remote>,
    events: EventLog,
    state: Mutex<StoreState>,
}

impl AppStore {
    pub fn new(remote: Arc<dyn Remote>, events: EventLog) -> Self {
        Self {
            remote,
            events,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    // ---- loading ----

    /// Fetch issues and sprints concurrently and replace both collections
    pub async fn load_data(&self) -> ClientResult<()> {
        debug!("Loading issues and sprints");

        let loaded = tokio::try_join!(self.remote.list_issues(), self.remote.list_sprints());

        let mut state = self.state();
        match loaded {
            Ok((issues, sprints)) => {
                info!("Loaded {} issues and {} sprints", issues.len(), sprints.len());
                state.issues = issues;
                state.sprints = sprints;
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load data: {}", e);
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch the user directory. On failure the previous profiles are kept and
    /// names fall back to raw ids.
    pub async fn load_profiles(&self) -> ClientResult<()> {
        match self.remote.list_profiles().await {
            Ok(profiles) => {
                debug!("Loaded {} profiles", profiles.len());
                self.state().profiles = profiles;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load profiles: {}", e);
                Err(e)
            }
        }
    }

    /// Message of the last failed load, if the most recent load failed
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    // ---- read accessors ----

    pub fn issues(&self) -> Vec<Issue> {
        self.state().issues.clone()
    }

    pub fn sprints(&self) -> Vec<Sprint> {
        self.state().sprints.clone()
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.state().profiles.clone()
    }

    /// Display name for an assignee id, resolved through the cached profiles
    pub fn assignee_name(&self, assignee_id: Option<&str>) -> String {
        assignee_name(&self.state().profiles, assignee_id)
    }

    pub fn issue(&self, issue_id: &str) -> Option<Issue> {
        self.state().issues.iter().find(|i| i.id == issue_id).cloned()
    }

    pub fn sprint(&self, sprint_id: &str) -> Option<Sprint> {
        self.state()
            .sprints
            .iter()
            .find(|s| s.id == sprint_id)
            .cloned()
    }

    pub fn active_sprint(&self) -> Option<Sprint> {
        self.state().sprints.iter().find(|s| s.is_active()).cloned()
    }

    /// The sprint reports open on when none is chosen
    pub fn current_sprint(&self) -> Option<Sprint> {
        current_sprint(&self.state().sprints).cloned()
    }

    pub fn issues_in_sprint(&self, sprint_id: &str) -> Vec<Issue> {
        self.state()
            .issues
            .iter()
            .filter(|i| i.in_sprint(sprint_id))
            .cloned()
            .collect()
    }

    pub fn backlog(&self) -> Vec<Issue> {
        self.state()
            .issues
            .iter()
            .filter(|i| i.in_backlog())
            .cloned()
            .collect()
    }

    pub fn issues_assigned_to(&self, user_id: &str) -> Vec<Issue> {
        self.state()
            .issues
            .iter()
            .filter(|i| i.assignee_id.as_deref() == Some(user_id))
            .cloned()
            .collect()
    }

    /// True while a status mutation on the issue awaits its response
    pub fn is_in_flight(&self, issue_id: &str) -> bool {
        self.mutation_phase(issue_id) == MutationPhase::Applying
    }

    pub fn mutation_phase(&self, issue_id: &str) -> MutationPhase {
        self.state()
            .mutations
            .get(issue_id)
            .map(|slot| slot.phase)
            .unwrap_or(MutationPhase::Idle)
    }

    // ---- optimistic status mutator ----

    /// Move an issue to `to_status`, showing the change before the server confirms it.
    ///
    /// A failed call restores the last server-confirmed status and `updated_at`
    /// and returns the error. When a newer move on the same issue was issued
    /// first, this call settles as [`MutationOutcome::Superseded`] and the newer
    /// move decides the visible state, unless it already settled, in which case
    /// a newer server record from this call is cached. A move whose issue was
    /// deleted meanwhile returns the remote error, or not-found on success.
    pub async fn move_issue_status(
        &self,
        issue_id: &str,
        to_status: IssueStatus,
        new_index: Option<i64>,
    ) -> ClientResult<MutationOutcome> {
        let (seq, from_status, sprint_id) = {
            let mut guard = self.state();
            let StoreState {
                issues,
                mutations,
                next_seq,
                ..
            } = &mut *guard;

            let Some(issue) = issues.iter_mut().find(|i| i.id == issue_id) else {
                debug!("Status move for unknown issue {}", issue_id);
                return Err(ClientError::issue_not_found(issue_id));
            };

            let snapshot = StatusSnapshot::of(issue);
            issue.status = to_status;
            issue.updated_at = Utc::now();

            *next_seq += 1;
            let seq = *next_seq;

            let slot = mutations
                .entry(issue_id.to_string())
                .or_insert(MutationSlot {
                    seq,
                    phase: MutationPhase::Idle,
                    base: snapshot,
                });
            // An in-flight predecessor keeps the last confirmed snapshot as base
            if slot.phase != MutationPhase::Applying {
                slot.base = snapshot;
            } else {
                debug!("Superseding in-flight move of {} (seq {})", issue_id, slot.seq);
            }
            slot.seq = seq;
            slot.phase = MutationPhase::Applying;

            (seq, snapshot.status, issue.sprint_id.clone())
        };

        let mut pending = PendingMutation {
            store: self,
            issue_id,
            seq,
            settled: false,
        };

        self.events
            .record(TelemetryEvent::dnd_move(from_status, to_status))
            .await;

        let request = UpdateIssueStatusRequest {
            issue_id: issue_id.to_string(),
            to_status,
            sprint_id,
            new_index: Some(new_index.unwrap_or(0)),
        };

        let result = self.remote.update_issue_status(&request).await;
        pending.settled = true;

        match result {
            Ok(issue) => match self.settle(issue_id, seq, Settlement::Succeeded(issue.clone())) {
                Settled::Latest => Ok(MutationOutcome::Confirmed(issue)),
                Settled::Stale => Ok(MutationOutcome::Superseded),
                Settled::Orphaned => Err(ClientError::issue_not_found(issue_id)),
            },
            Err(e) => match self.settle(issue_id, seq, Settlement::Failed(e.to_string())) {
                Settled::Latest | Settled::Orphaned => Err(e),
                Settled::Stale => Ok(MutationOutcome::Superseded),
            },
        }
    }

    /// Apply a settled mutation to the slot and the cached issue
    fn settle(&self, issue_id: &str, seq: u64, settlement: Settlement) -> Settled {
        let mut guard = self.state();
        let StoreState {
            issues, mutations, ..
        } = &mut *guard;

        let Some(slot) = mutations.get_mut(issue_id) else {
            debug!("Status move of {} settled after the issue was removed", issue_id);
            return Settled::Orphaned;
        };
        let issue = issues.iter_mut().find(|i| i.id == issue_id);

        if slot.seq != seq {
            match settlement {
                Settlement::Succeeded(confirmed) => {
                    if confirmed.updated_at < slot.base.updated_at {
                        debug!("Ignoring outdated confirmation for {} (seq {})", issue_id, seq);
                    } else if slot.phase == MutationPhase::Applying {
                        debug!("Stale confirmation for {} (seq {})", issue_id, seq);
                        slot.base = StatusSnapshot::of(&confirmed);
                    } else {
                        // The newer move already settled; the server record wins
                        debug!(
                            "Late confirmation for {} (seq {}) refreshes cache",
                            issue_id, seq
                        );
                        slot.base = StatusSnapshot::of(&confirmed);
                        slot.phase = MutationPhase::Confirmed;
                        if let Some(issue) = issue {
                            *issue = confirmed;
                        }
                    }
                }
                Settlement::Failed(reason) => {
                    debug!("Ignoring stale failure for {} (seq {}): {}", issue_id, seq, reason);
                }
                Settlement::Cancelled => {}
            }
            return Settled::Stale;
        }

        match settlement {
            Settlement::Succeeded(confirmed) => {
                slot.base = StatusSnapshot::of(&confirmed);
                slot.phase = MutationPhase::Confirmed;
                if let Some(issue) = issue {
                    *issue = confirmed;
                }
            }
            Settlement::Failed(reason) => {
                warn!("Rolling back status of {}: {}", issue_id, reason);
                slot.phase = MutationPhase::RolledBack;
                if let Some(issue) = issue {
                    slot.base.restore(issue);
                }
            }
            Settlement::Cancelled => {
                warn!("Status move of {} cancelled, rolling back", issue_id);
                slot.phase = MutationPhase::RolledBack;
                if let Some(issue) = issue {
                    slot.base.restore(issue);
                }
            }
        }
        Settled::Latest
    }

    // ---- issues ----

    pub async fn create_issue(&self, input: &IssueCreateInput) -> ClientResult<Issue> {
        validate_issue_create(input)?;

        let issue = self.remote.create_issue(input).await?;
        self.state().upsert_issue(issue.clone());
        Ok(issue)
    }

    /// Generic field patch, applied to the cache once the server accepts it
    pub async fn update_issue(&self, issue_id: &str, patch: &IssuePatch) -> ClientResult<Issue> {
        validate_issue_patch(issue_id, patch)?;

        let issue = self.remote.update_issue(issue_id, patch).await?;
        self.state().upsert_issue(issue.clone());
        Ok(issue)
    }

    /// Status change through the generic patch path (no optimistic display)
    pub async fn update_issue_status(
        &self,
        issue_id: &str,
        status: IssueStatus,
    ) -> ClientResult<Issue> {
        let patch = IssuePatch {
            status: Some(status),
            ..Default::default()
        };
        self.update_issue(issue_id, &patch).await
    }

    pub async fn delete_issue(&self, issue_id: &str) -> ClientResult<()> {
        self.remote.delete_issue(issue_id).await?;

        let mut state = self.state();
        state.issues.retain(|i| i.id != issue_id);
        state.mutations.remove(issue_id);
        for child in state.issues.iter_mut() {
            if child.parent_id.as_deref() == Some(issue_id) {
                child.parent_id = None;
            }
        }
        Ok(())
    }

    /// Put one issue into a sprint, or back in the backlog with `None`
    pub async fn assign_issue_to_sprint(
        &self,
        issue_id: &str,
        sprint_id: Option<&str>,
    ) -> ClientResult<Issue> {
        let patch = IssuePatch {
            sprint_id: Some(sprint_id.map(String::from)),
            ..Default::default()
        };
        self.update_issue(issue_id, &patch).await
    }

    pub async fn bulk_assign_to_sprint(
        &self,
        issue_ids: &[String],
        sprint_id: Option<&str>,
    ) -> ClientResult<Vec<Issue>> {
        let request = BulkAssignRequest {
            issue_ids: issue_ids.to_vec(),
            sprint_id: sprint_id.map(String::from),
        };
        let updated = self.remote.bulk_assign(&request).await?;

        let mut state = self.state();
        for issue in &updated {
            state.upsert_issue(issue.clone());
        }
        Ok(updated)
    }

    // ---- sprints ----

    pub async fn create_sprint(&self, input: &SprintCreateInput) -> ClientResult<Sprint> {
        validate_sprint_create(input)?;

        let sprint = self.remote.create_sprint(input).await?;
        self.state().upsert_sprint(sprint.clone());
        Ok(sprint)
    }

    pub async fn update_sprint(&self, sprint_id: &str, patch: &SprintPatch) -> ClientResult<Sprint> {
        if let Some(mut preview) = self.sprint(sprint_id) {
            patch.apply_to(&mut preview);
            validate_sprint_dates(preview.start_date, preview.end_date)?;
        }

        let sprint = self.remote.update_sprint(sprint_id, patch).await?;
        self.state().upsert_sprint(sprint.clone());
        Ok(sprint)
    }

    /// Delete a sprint; its cached issues return to the backlog
    pub async fn delete_sprint(&self, sprint_id: &str) -> ClientResult<()> {
        self.remote.delete_sprint(sprint_id).await?;

        let mut state = self.state();
        state.sprints.retain(|s| s.id != sprint_id);
        for issue in state.issues.iter_mut() {
            if issue.in_sprint(sprint_id) {
                issue.sprint_id = None;
            }
        }
        Ok(())
    }

    pub async fn start_sprint(&self, sprint_id: &str) -> ClientResult<SprintStartResult> {
        let result = self.remote.start_sprint(sprint_id).await?;

        let mut state = self.state();
        for demoted in &result.demoted {
            state.upsert_sprint(demoted.clone());
        }
        state.upsert_sprint(result.sprint.clone());
        Ok(result)
    }

    /// Complete a sprint; unfinished issues return to the backlog
    pub async fn end_sprint(&self, sprint_id: &str) -> ClientResult<SprintEndResult> {
        let result = self.remote.end_sprint(sprint_id).await?;

        let mut state = self.state();
        state.upsert_sprint(result.sprint.clone());
        state.detach_issues(&result.detached_issue_ids);
        Ok(result)
    }
}

/// Rolls the mutation back if the mutator future is dropped before the remote call settles
struct PendingMutation<'a> {
    store: &'a AppStore,
    issue_id: &'a str,
    seq: u64,
    settled: bool,
}

impl Drop for PendingMutation<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.store
                .settle(self.issue_id, self.seq, Settlement::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flowcraft_core::{IssueType, Priority};

    fn issue(id: &str, status: IssueStatus) -> Issue {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Issue {
            id: id.to_string(),
            title: id.to_string(),
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

    #[test]
    fn test_snapshot_restore_touches_only_status_and_timestamp() {
        let original = issue("TSK-001", IssueStatus::Todo);
        let snapshot = StatusSnapshot::of(&original);

        let mut edited = original.clone();
        edited.status = IssueStatus::Done;
        edited.updated_at = Utc::now();
        edited.title = "Renamed".to_string();

        snapshot.restore(&mut edited);
        assert_eq!(edited.status, IssueStatus::Todo);
        assert_eq!(edited.updated_at, original.updated_at);
        assert_eq!(edited.title, "Renamed");
    }

    #[test]
    fn test_upsert_active_sprint_demotes_others() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let sprint = |id: &str, status| Sprint {
            id: id.to_string(),
            name: id.to_string(),
            status,
            start_date: ts.date_naive(),
            end_date: ts.date_naive() + chrono::Duration::days(14),
            created_at: ts,
            updated_at: ts,
            completed_at: None,
            created_by: None,
        };

        let mut state = StoreState::default();
        state.upsert_sprint(sprint("SPR-001", SprintStatus::Active));
        state.upsert_sprint(sprint("SPR-002", SprintStatus::Active));

        let active: Vec<&str> = state
            .sprints
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(active, vec!["SPR-002"]);
    }

    #[test]
    fn test_detach_issues() {
        let mut state = StoreState::default();
        let mut a = issue("TSK-001", IssueStatus::Todo);
        a.sprint_id = Some("SPR-001".to_string());
        let mut b = issue("TSK-002", IssueStatus::Done);
        b.sprint_id = Some("SPR-001".to_string());
        state.issues = vec![a, b];

        state.detach_issues(&["TSK-001".to_string()]);
        assert!(state.issues[0].sprint_id.is_none());
        assert!(state.issues[1].sprint_id.is_some());
    }
}
