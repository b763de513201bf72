//! Seed records a fresh install starts from, and which sign-out restores.

use crate::model::{Category, ImageRef, Issue, IssueStatus, Notification, NotificationKind, Priority, User};

/// Static asset substituted for reports submitted without photos.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=200&width=300";

pub fn seed_user() -> User {
    User {
        name: "John Doe".into(),
        email: "john.doe@email.com".into(),
        location: "Downtown District".into(),
        member_since: "January 2024".into(),
        reports_count: 12,
        resolved_count: 8,
        points: 340,
        rank: 23,
    }
}

pub fn seed_issues() -> Vec<Issue> {
    vec![
        Issue {
            id: "CIV-2024-001".into(),
            title: "Large pothole causing traffic issues".into(),
            description:
                "Deep pothole approximately 3 feet wide causing vehicles to swerve dangerously."
                    .into(),
            category: Category::Roads,
            location: "Main Street & 5th Avenue".into(),
            images: vec![ImageRef::placeholder()],
            status: IssueStatus::InProgress,
            priority: Priority::High,
            upvotes: 45,
            comments: 12,
            reported_by: "John D.".into(),
            time_ago: "2 hours ago".into(),
            created_at: "2024-01-20T10:00:00Z".into(),
        },
        Issue {
            id: "CIV-2024-002".into(),
            title: "Broken street light creating safety hazard".into(),
            description: "Street light has been out for over a week, making the area unsafe for pedestrians at night.".into(),
            category: Category::Lighting,
            location: "Park Avenue near Central School".into(),
            images: vec![ImageRef::placeholder()],
            status: IssueStatus::Verified,
            priority: Priority::Medium,
            upvotes: 28,
            comments: 8,
            reported_by: "Sarah M.".into(),
            time_ago: "1 day ago".into(),
            created_at: "2024-01-19T14:30:00Z".into(),
        },
        Issue {
            id: "CIV-2024-003".into(),
            title: "Overflowing garbage bins attracting pests".into(),
            description:
                "Multiple garbage bins overflowing for several days, creating unsanitary conditions."
                    .into(),
            category: Category::Waste,
            location: "Central Market Square".into(),
            images: vec![ImageRef::placeholder()],
            status: IssueStatus::Resolved,
            priority: Priority::Medium,
            upvotes: 19,
            comments: 5,
            reported_by: "Mike R.".into(),
            time_ago: "3 days ago".into(),
            created_at: "2024-01-17T09:15:00Z".into(),
        },
    ]
}

pub fn seed_notifications() -> Vec<Notification> {
    let seed = |id: &str, title: &str, description: &str, kind, time: &str, read| Notification {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        kind,
        time: time.into(),
        read,
    };
    vec![
        seed(
            "1",
            "Your pothole report has been verified",
            "Main Street & 5th Ave - Road Maintenance team assigned",
            NotificationKind::StatusUpdate,
            "2 hours ago",
            false,
        ),
        seed(
            "2",
            "Issue resolved in your area",
            "Broken street light on Park Avenue has been fixed",
            NotificationKind::Resolved,
            "5 hours ago",
            false,
        ),
        seed(
            "3",
            "New issue reported nearby",
            "Overflowing garbage bin - Central Market",
            NotificationKind::NewIssue,
            "1 day ago",
            true,
        ),
        seed(
            "4",
            "You earned 50 points!",
            "Your report helped resolve a community issue",
            NotificationKind::Points,
            "2 days ago",
            true,
        ),
    ]
}
