//! Entity records held by the application store.
//!
//! Field names serialize in camelCase so the persisted document keeps the
//! `{ user, issues, notifications }` shape the web client has always used.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

/// Reference to an image attached to an issue: an object URL, a data URL
/// produced by the camera, or a static asset path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap any string-like reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The static asset shown when a report carries no photos.
    pub fn placeholder() -> Self {
        Self(crate::seed::PLACEHOLDER_IMAGE.to_owned())
    }

    /// Borrow the underlying reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the placeholder asset.
    pub fn is_placeholder(&self) -> bool {
        self.0 == crate::seed::PLACEHOLDER_IMAGE
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of civic problem being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Roads,
    Lighting,
    Waste,
    Water,
    Parks,
    Other,
}

impl Category {
    /// Every category, in the order the report form lists them.
    pub const ALL: [Category; 6] = [
        Category::Roads,
        Category::Lighting,
        Category::Waste,
        Category::Water,
        Category::Parks,
        Category::Other,
    ];

    /// The lowercase identifier used in storage and in select values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Roads => "roads",
            Category::Lighting => "lighting",
            Category::Waste => "waste",
            Category::Water => "water",
            Category::Parks => "parks",
            Category::Other => "other",
        }
    }

    /// Parse a category identifier, ignoring ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
    }
}

/// Where an issue sits in the triage progression.
///
/// Variants are declared in progression order, so `Ord` follows
/// Submitted < Verified < In Progress < Resolved. No transition rules are
/// enforced here; status changes come from outside the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    Submitted,
    Verified,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl IssueStatus {
    /// Every status, in progression order.
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Submitted,
        IssueStatus::Verified,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
    ];

    /// Human readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            IssueStatus::Submitted => "Submitted",
            IssueStatus::Verified => "Verified",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }

    /// Kebab-case slug used by the status filter (`"in-progress"`).
    pub fn slug(&self) -> &'static str {
        match self {
            IssueStatus::Submitted => "submitted",
            IssueStatus::Verified => "verified",
            IssueStatus::InProgress => "in-progress",
            IssueStatus::Resolved => "resolved",
        }
    }

    /// Parse a filter slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Triage urgency. Newly submitted issues start at `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Lowercase identifier used by the priority select (`"high"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parse a priority identifier, ignoring ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(value))
    }
}

/// A reported civic problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    /// Free text address or a `"lat, lng"` pair.
    pub location: String,
    pub images: Vec<ImageRef>,
    pub status: IssueStatus,
    pub priority: Priority,
    pub upvotes: u32,
    pub comments: u32,
    pub reported_by: String,
    /// Display string such as "2 hours ago"; not recomputed.
    pub time_ago: String,
    /// ISO-8601 timestamp.
    pub created_at: String,
}

impl Issue {
    /// Swap an empty image list for a single placeholder reference.
    ///
    /// The creation flow calls this before handing the issue to the store;
    /// the store itself accepts whatever it is given.
    pub fn with_placeholder_if_empty(mut self) -> Self {
        if self.images.is_empty() {
            self.images.push(ImageRef::placeholder());
        }
        self
    }
}

/// Category of an in-app activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StatusUpdate,
    Resolved,
    Points,
    NewIssue,
}

/// An in-app activity or alert record.
///
/// Distinct from an OS-level push notification, although sending a push
/// through [`Notifier`](crate::adapters::notify::Notifier) also logs one of
/// these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display string such as "Just now".
    pub time: String,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    /// Build an unread record stamped "Just now" with a timestamp-derived id.
    pub fn just_now(
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: timestamp_id(),
            title: title.into(),
            description: description.into(),
            kind,
            time: JUST_NOW.to_owned(),
            read: false,
        }
    }
}

/// Display string for records created in the current session.
pub const JUST_NOW: &str = "Just now";

/// Last id handed out by [`timestamp_id`].
static LAST_TIMESTAMP_ID: AtomicI64 = AtomicI64::new(0);

/// Milliseconds since the Unix epoch, as a string token.
///
/// Ids are strictly increasing within the process: when the clock has not
/// advanced since the previous call (or went backwards), the previous id
/// plus one is used instead.
pub(crate) fn timestamp_id() -> String {
    let now = chrono::Utc::now().timestamp_millis();
    let next = |last: i64| now.max(last.saturating_add(1));
    let previous = LAST_TIMESTAMP_ID
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| Some(next(last)))
        .unwrap_or_else(|previous| previous);
    next(previous).to_string()
}

/// Profile and cumulative stats of the signed-in citizen.
///
/// Counters are signed so a negative delta can never wrap; nothing here
/// clamps them at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    pub location: String,
    pub member_since: String,
    pub reports_count: i64,
    pub resolved_count: i64,
    pub points: i64,
    /// Leaderboard position, assigned externally.
    pub rank: u32,
}

/// Signed adjustments to the user's counters. Omitted fields count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
}

impl StatsDelta {
    /// A delta touching only the points balance.
    ///
    /// # Arguments
    ///
    /// * `points` - Signed amount to add; negative to spend.
    pub fn points(points: i64) -> Self {
        Self {
            points: Some(points),
            ..Self::default()
        }
    }

    /// Also adjust the submitted-reports counter.
    pub fn with_reports(mut self, reports: i64) -> Self {
        self.reports_count = Some(reports);
        self
    }

    /// Also adjust the resolved-reports counter.
    pub fn with_resolved(mut self, resolved: i64) -> Self {
        self.resolved_count = Some(resolved);
        self
    }

    /// True when every field is absent or zero.
    pub fn is_empty(&self) -> bool {
        [self.reports_count, self.resolved_count, self.points]
            .into_iter()
            .all(|v| v.unwrap_or(0) == 0)
    }
}
