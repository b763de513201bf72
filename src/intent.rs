//! User intents the views trigger: each is a short sequence of store
//! operations and, where the user expects one, a native notification.

use chrono::{Datelike, SecondsFormat, Utc};

use crate::adapters::notify::{NotificationPlatform, Notifier};
use crate::model::{
    Category, ImageRef, Issue, IssueStatus, JUST_NOW, Notification, NotificationKind, Priority,
    StatsDelta,
};
use crate::store::AppStore;

/// Reporter name stamped on issues filed from this device.
pub const SELF_REPORTER: &str = "You";

/// Points for filing a report.
pub const REPORT_POINTS: i64 = 25;

/// Points for upvoting an issue.
pub const UPVOTE_POINTS: i64 = 5;

/// The report form's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: String,
    pub images: Vec<ImageRef>,
}

impl ReportDraft {
    /// Attach a photo from the camera or a file picker.
    pub fn attach(&mut self, image: ImageRef) {
        self.images.push(image);
    }

    /// Detach the photo at `index`, if present.
    pub fn detach(&mut self, index: usize) -> Option<ImageRef> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// Turn the draft into a freshly submitted issue.
    ///
    /// An empty photo list becomes a single placeholder.
    pub fn into_issue(self, id: impl Into<String>, created_at: impl Into<String>) -> Issue {
        Issue {
            id: id.into(),
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            images: self.images,
            status: IssueStatus::Submitted,
            priority: Priority::Medium,
            upvotes: 0,
            comments: 0,
            reported_by: SELF_REPORTER.to_owned(),
            time_ago: JUST_NOW.to_owned(),
            created_at: created_at.into(),
        }
        .with_placeholder_if_empty()
    }
}

/// A fresh issue id of the form `CIV-<year>-<8 hex digits>`.
pub fn new_issue_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("CIV-{}-{}", Utc::now().year(), suffix[..8].to_uppercase())
}

/// Submit a report: store the issue, log the confirmation, push a native
/// notification and award points.
///
/// # Arguments
///
/// * `store` - Store the issue and notifications are added to.
/// * `notifier` - Sends the "Issue Reported!" push when permitted.
/// * `draft` - The filled-in report form.
///
/// # Returns
///
/// The new issue's id.
pub fn submit_report<P: NotificationPlatform>(
    store: &AppStore,
    notifier: &Notifier<P>,
    draft: ReportDraft,
) -> String {
    let id = new_issue_id();
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let title = draft.title.clone();

    store.add_issue(draft.into_issue(id.clone(), created_at));
    store.add_notification(Notification::just_now(
        NotificationKind::StatusUpdate,
        "Issue reported successfully!",
        format!("Your report \"{title}\" has been submitted"),
    ));
    notifier.send_notification(
        "Issue Reported!",
        &format!(
            "Your report \"{title}\" has been submitted successfully. You earned {REPORT_POINTS} points!"
        ),
    );
    store.update_user_stats(StatsDelta::points(REPORT_POINTS).with_reports(1));

    tracing::info!(issue_id = %id, "report submitted");
    id
}

/// Upvote an issue: award points and thank the user.
///
/// The issue's own upvote counter is owned by the backend and is not
/// changed here.
pub fn upvote_issue<P: NotificationPlatform>(store: &AppStore, notifier: &Notifier<P>, issue_id: &str) {
    store.update_user_stats(StatsDelta::points(UPVOTE_POINTS));
    notifier.send_notification(
        "Issue Upvoted!",
        &format!("Thanks for supporting this community issue. +{UPVOTE_POINTS} points earned!"),
    );
    tracing::debug!(issue_id, "issue upvoted");
}

/// Something the user can spend points on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub title: String,
    pub points: i64,
}

impl Reward {
    pub fn new(title: impl Into<String>, points: i64) -> Self {
        Self {
            title: title.into(),
            points,
        }
    }
}

/// Why a reward could not be redeemed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedeemError {
    #[error("you need {missing} more points to redeem this reward")]
    InsufficientPoints { missing: i64 },
}

/// Spend points on `reward` and log it.
///
/// # Errors
///
/// Returns [`RedeemError::InsufficientPoints`] and changes nothing if the
/// user cannot afford the reward.
pub fn redeem_reward(store: &AppStore, reward: &Reward) -> Result<(), RedeemError> {
    let points = store.user().points;
    if points < reward.points {
        return Err(RedeemError::InsufficientPoints {
            missing: reward.points.saturating_sub(points),
        });
    }
    store.update_user_stats(StatsDelta::points(reward.points.saturating_neg()));
    store.add_notification(Notification::just_now(
        NotificationKind::Points,
        "Reward Redeemed!",
        format!("You've successfully redeemed: {}", reward.title),
    ));
    Ok(())
}

/// Mark every unread notification as read, then confirm with a native
/// notification when permission allows.
///
/// The confirmation is sent even if nothing was unread, and is itself
/// logged as a new unread record by the [`Notifier`].
///
/// # Arguments
///
/// * `store` - Store whose notification feed is cleared.
/// * `notifier` - Used for the "Notifications cleared!" push.
///
/// # Returns
///
/// How many notifications were marked read.
pub fn mark_all_read<P: NotificationPlatform>(store: &AppStore, notifier: &Notifier<P>) -> usize {
    let unread: Vec<String> = store
        .notifications()
        .into_iter()
        .filter(|n| !n.read)
        .map(|n| n.id)
        .collect();
    for id in &unread {
        store.mark_notification_as_read(id);
    }
    notifier.send_notification(
        "Notifications cleared!",
        "All your notifications have been marked as read.",
    );
    tracing::debug!(marked = unread.len(), "notifications marked read");
    unread.len()
}

/// Sign out: drop everything back to the seed.
pub fn sign_out(store: &AppStore) {
    store.clear_all_data();
    tracing::info!("signed out");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notify::Permission;
    use crate::adapters::notify::fakes::FakePlatform;
    use crate::action::AppState;

    fn draft() -> ReportDraft {
        ReportDraft {
            title: "Blocked drain".into(),
            description: "Water pooling after rain".into(),
            category: Category::Water,
            location: "40.712800, -74.006000".into(),
            images: vec![],
        }
    }

    #[test]
    fn issue_id_has_expected_shape() {
        let id = new_issue_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "CIV");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_issue_id(), new_issue_id());
    }

    #[test]
    fn draft_without_images_gets_placeholder() {
        let issue = draft().into_issue("X1", "2024-06-01T00:00:00Z");
        assert_eq!(issue.images, vec![ImageRef::placeholder()]);
        assert_eq!(issue.status, IssueStatus::Submitted);
        assert_eq!(issue.priority, Priority::Medium);
        assert_eq!(issue.reported_by, SELF_REPORTER);
        assert_eq!(issue.time_ago, JUST_NOW);
    }

    #[test]
    fn attach_and_detach_images() {
        let mut d = draft();
        d.attach(ImageRef::new("blob:1"));
        d.attach(ImageRef::new("blob:2"));
        assert_eq!(d.detach(0), Some(ImageRef::new("blob:1")));
        assert_eq!(d.detach(5), None);
        let issue = d.into_issue("X2", "2024-06-01T00:00:00Z");
        assert_eq!(issue.images, vec![ImageRef::new("blob:2")]);
    }

    #[test]
    fn submit_report_with_push_permission() {
        let store = AppStore::in_memory();
        let notifier = Notifier::new(FakePlatform::granted(), store.clone());

        let id = submit_report(&store, &notifier, draft());

        let state = store.snapshot();
        assert_eq!(state.issues[0].id, id);
        assert_eq!(state.issues[0].reported_by, "You");
        assert!(chrono::DateTime::parse_from_rfc3339(&state.issues[0].created_at).is_ok());
        // Push record first, then the in-app confirmation, then the seed.
        assert_eq!(state.notifications[0].title, "Issue Reported!");
        assert_eq!(state.notifications[1].title, "Issue reported successfully!");
        assert_eq!(
            state.notifications[1].description,
            "Your report \"Blocked drain\" has been submitted"
        );
        assert_eq!(state.notifications.len(), 6);
        assert_eq!(state.user.points, 365);
        assert_eq!(state.user.reports_count, 13);
    }

    #[test]
    fn submit_report_without_permission_skips_push_record() {
        let store = AppStore::in_memory();
        let notifier = Notifier::new(
            FakePlatform::undecided(Ok(Permission::Denied)),
            store.clone(),
        );

        submit_report(&store, &notifier, draft());

        let state = store.snapshot();
        assert_eq!(state.notifications.len(), 5);
        assert_eq!(state.notifications[0].title, "Issue reported successfully!");
        assert_eq!(state.user.points, 365);
    }

    #[test]
    fn upvote_awards_points() {
        let store = AppStore::in_memory();
        let notifier = Notifier::new(FakePlatform::granted(), store.clone());

        upvote_issue(&store, &notifier, "CIV-2024-001");

        assert_eq!(store.user().points, 345);
        assert_eq!(store.notifications()[0].title, "Issue Upvoted!");
        assert_eq!(store.issue("CIV-2024-001").map(|i| i.upvotes), Some(45));
    }

    #[test]
    fn redeem_spends_points_and_logs() {
        let store = AppStore::in_memory();
        redeem_reward(&store, &Reward::new("Coffee voucher", 100)).expect("affordable");

        assert_eq!(store.user().points, 240);
        let first = &store.notifications()[0];
        assert_eq!(first.kind, NotificationKind::Points);
        assert_eq!(first.description, "You've successfully redeemed: Coffee voucher");
    }

    #[test]
    fn redeem_unaffordable_changes_nothing() {
        let store = AppStore::in_memory();
        let err = redeem_reward(&store, &Reward::new("Bike", 500)).expect_err("too expensive");

        assert_eq!(err, RedeemError::InsufficientPoints { missing: 160 });
        assert_eq!(err.to_string(), "you need 160 more points to redeem this reward");
        assert_eq!(store.snapshot(), AppState::seed());
    }

    #[test]
    fn mark_all_read_without_permission_clears_unread() {
        let store = AppStore::in_memory();
        let platform = FakePlatform::undecided(Ok(Permission::Denied));
        let notifier = Notifier::new(platform, store.clone());

        assert_eq!(mark_all_read(&store, &notifier), 2);
        assert_eq!(store.unread_count(), 0);
        assert_eq!(store.notifications().len(), 4);
        assert_eq!(mark_all_read(&store, &notifier), 0);
    }

    #[test]
    fn mark_all_read_with_permission_confirms_by_push() {
        let store = AppStore::in_memory();
        let notifier = Notifier::new(FakePlatform::granted(), store.clone());

        assert_eq!(mark_all_read(&store, &notifier), 2);

        let first = &store.notifications()[0];
        assert_eq!(first.title, "Notifications cleared!");
        assert_eq!(first.description, "All your notifications have been marked as read.");
        assert!(!first.read);
        // Only the confirmation itself is unread.
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn marking_one_submit_record_leaves_the_other_unread() {
        let store = AppStore::in_memory();
        let notifier = Notifier::new(FakePlatform::granted(), store.clone());
        for i in 0..20 {
            submit_report(&store, &notifier, ReportDraft {
                title: format!("Report {i}"),
                ..draft()
            });
        }

        let notifications = store.notifications();
        let push_id = notifications[0].id.clone();
        assert_ne!(push_id, notifications[1].id);
        store.mark_notification_as_read(&push_id);

        let after = store.notifications();
        assert!(after[0].read);
        assert!(!after[1].read);
        assert_eq!(store.unread_count(), 2 + 40 - 1);
    }

    #[test]
    fn sign_out_restores_seed() {
        let store = AppStore::in_memory();
        let notifier = Notifier::new(FakePlatform::granted(), store.clone());
        submit_report(&store, &notifier, draft());
        mark_all_read(&store, &notifier);

        sign_out(&store);

        assert_eq!(store.snapshot(), AppState::seed());
    }
}
