//! Read-side helpers the views compute from a snapshot.
//!
//! Nothing here is stored; every function is a plain projection over the
//! slices held in an [`AppState`](crate::AppState).

use std::collections::BTreeMap;

use crate::model::{Category, Issue, IssueStatus, Notification, Priority};

/// Select value meaning "no constraint".
const ALL: &str = "all";

/// Criteria for the issue list.
///
/// An empty `search` matches everything; `None` for category, status or
/// priority means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub search: String,
    pub category: Option<Category>,
    pub status: Option<IssueStatus>,
    pub priority: Option<Priority>,
}

impl IssueFilter {
    /// Build a filter from the raw values of the search box and the two
    /// selects. `"all"` or an unrecognised value leaves that dimension open;
    /// status values are slugs such as `"in-progress"`.
    pub fn from_selects(search: &str, category: &str, status: &str) -> Self {
        let category = (category != ALL).then(|| Category::parse(category)).flatten();
        let status = (status != ALL).then(|| IssueStatus::from_slug(status)).flatten();
        Self {
            search: search.to_owned(),
            category,
            status,
            priority: None,
        }
    }

    /// Build a filter from the admin triage view: search box, status select
    /// and priority select.
    ///
    /// # Arguments
    ///
    /// * `search` - Free text matched against title and location.
    /// * `status` - `"all"` or a status slug such as `"in-progress"`.
    /// * `priority` - `"all"` or a lowercase priority such as `"high"`.
    pub fn from_admin_selects(search: &str, status: &str, priority: &str) -> Self {
        let priority = (priority != ALL).then(|| Priority::parse(priority)).flatten();
        Self {
            priority,
            ..Self::from_selects(search, ALL, status)
        }
    }

    /// Replace the search term.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Whether `issue` satisfies every criterion.
    ///
    /// The search term is matched case-insensitively against title and
    /// location.
    pub fn matches(&self, issue: &Issue) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = issue.title.to_lowercase().contains(&needle)
            || issue.location.to_lowercase().contains(&needle);
        let matches_category = self.category.is_none_or(|c| c == issue.category);
        let matches_status = self.status.is_none_or(|s| s == issue.status);
        let matches_priority = self.priority.is_none_or(|p| p == issue.priority);
        matches_search && matches_category && matches_status && matches_priority
    }
}

/// Issues satisfying `filter`, in their stored order.
pub fn filter_issues<'a>(issues: &'a [Issue], filter: &IssueFilter) -> Vec<&'a Issue> {
    issues.iter().filter(|i| filter.matches(i)).collect()
}

/// Number of notifications with `read == false`.
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// Issues whose reporter display name equals `name`.
pub fn reported_by<'a>(issues: &'a [Issue], name: &str) -> Vec<&'a Issue> {
    issues.iter().filter(|i| i.reported_by == name).collect()
}

/// Issues whose location contains `needle`, case-sensitively.
pub fn at_location<'a>(issues: &'a [Issue], needle: &str) -> Vec<&'a Issue> {
    issues.iter().filter(|i| i.location.contains(needle)).collect()
}

/// Status breakdown for dashboards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueStats {
    pub total: usize,
    /// Everything not yet resolved.
    pub open: usize,
    pub resolved: usize,
    pub by_status: BTreeMap<IssueStatus, usize>,
}

impl IssueStats {
    /// Tally `issues` by status.
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut stats = Self {
            total: issues.len(),
            ..Self::default()
        };
        for issue in issues {
            *stats.by_status.entry(issue.status).or_default() += 1;
            if issue.status == IssueStatus::Resolved {
                stats.resolved += 1;
            } else {
                stats.open += 1;
            }
        }
        stats
    }
}
