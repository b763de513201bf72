//! Application snapshot and the pure transition function over it.

use serde::{Deserialize, Serialize};

use crate::model::{Issue, Notification, StatsDelta, User};
use crate::seed;

/// The complete client state: the signed-in user plus both collections.
///
/// Both collections are ordered most-recent-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub user: User,
    pub issues: Vec<Issue>,
    pub notifications: Vec<Notification>,
}

impl AppState {
    /// The state a fresh install starts from and sign-out returns to.
    pub fn seed() -> Self {
        Self {
            user: seed::seed_user(),
            issues: seed::seed_issues(),
            notifications: seed::seed_notifications(),
        }
    }

    /// A state with the seed user and no issues or notifications.
    pub fn empty() -> Self {
        Self {
            user: seed::seed_user(),
            issues: Vec::new(),
            notifications: Vec::new(),
        }
    }

    /// Apply a single action to produce the next state.
    ///
    /// Pure and total: no I/O, and every action yields a state. Field values
    /// are not validated; duplicate ids and negative counters pass through.
    /// Counter arithmetic saturates at `i64::MIN` / `i64::MAX`.
    pub fn apply(mut self, action: &Action) -> Self {
        match action {
            Action::AddIssue(issue) => {
                self.issues.insert(0, issue.clone());
            }
            Action::AddNotification(notification) => {
                self.notifications.insert(0, notification.clone());
            }
            Action::MarkNotificationAsRead { id } => {
                for n in self.notifications.iter_mut().filter(|n| &n.id == id) {
                    n.read = true;
                }
            }
            Action::UpdateUserStats(delta) => {
                // Saturate at the i64 extremes instead of overflowing.
                let user = &mut self.user;
                user.reports_count = user
                    .reports_count
                    .saturating_add(delta.reports_count.unwrap_or(0));
                user.resolved_count = user
                    .resolved_count
                    .saturating_add(delta.resolved_count.unwrap_or(0));
                user.points = user.points.saturating_add(delta.points.unwrap_or(0));
            }
            Action::ClearAllData => {
                self = Self::seed();
            }
        }
        self
    }

    /// Number of notifications not yet read.
    pub fn unread_count(&self) -> usize {
        crate::query::unread_count(&self.notifications)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::seed()
    }
}

/// Every mutation the store accepts.
///
/// Uses adjacently tagged serialization (`"type"` + `"data"`), so actions can
/// be logged or replayed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Action {
    /// Prepend an issue.
    AddIssue(Issue),
    /// Prepend a notification.
    AddNotification(Notification),
    /// Flip `read` to true on the notification with this exact id.
    MarkNotificationAsRead { id: String },
    /// Add signed deltas to the user's counters.
    UpdateUserStats(StatsDelta),
    /// Restore the seed user, issues and notifications.
    ClearAllData,
}

impl Action {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddIssue(_) => "add_issue",
            Action::AddNotification(_) => "add_notification",
            Action::MarkNotificationAsRead { .. } => "mark_notification_as_read",
            Action::UpdateUserStats(_) => "update_user_stats",
            Action::ClearAllData => "clear_all_data",
        }
    }
}
