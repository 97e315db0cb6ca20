// ABOUTME: Issue list filtering by title, assignee name, and priority

use serde::{Deserialize, Serialize};

use crate::types::{Issue, Priority};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    /// Case-insensitive substring of the title
    #[serde(default)]
    pub title: String,
    /// Case-insensitive substring of the resolved assignee name
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl IssueFilter {
    pub fn is_active(&self) -> bool {
        !self.title.is_empty() || !self.assignee.is_empty() || self.priority.is_some()
    }

    pub fn clear(&mut self) {
        *self = IssueFilter::default();
    }

    /// `name_of` maps an assignee id (or none) to a display name
    pub fn matches<F>(&self, issue: &Issue, name_of: F) -> bool
    where
        F: Fn(Option<&str>) -> String,
    {
        if !self.title.is_empty()
            && !issue
                .title
                .to_lowercase()
                .contains(&self.title.to_lowercase())
        {
            return false;
        }

        if !self.assignee.is_empty() {
            let name = name_of(issue.assignee_id.as_deref()).to_lowercase();
            if !name.contains(&self.assignee.to_lowercase()) {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if issue.priority != priority {
                return false;
            }
        }

        true
    }

    pub fn apply<'a, F>(&self, issues: &'a [Issue], name_of: F) -> Vec<&'a Issue>
    where
        F: Fn(Option<&str>) -> String,
    {
        issues
            .iter()
            .filter(|issue| self.matches(issue, &name_of))
            .collect()
    }
}
