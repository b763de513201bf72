//! Native notification permission and dispatch.
//!
//! Sending a native notification through [`Notifier`] also logs an in-app
//! [`Notification`](crate::Notification) record in the store, so the
//! activity feed mirrors what the OS showed.

use std::future::Future;

use tokio::sync::watch;

use crate::error::PlatformError;
use crate::model::{Notification, NotificationKind};
use crate::store::AppStore;

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Default,
}

/// The platform's notification capability.
pub trait NotificationPlatform: Send + Sync {
    /// Whether notifications exist on this platform at all.
    fn is_supported(&self) -> bool;

    /// The permission currently on record.
    fn permission(&self) -> Permission;

    /// Ask the user for permission. Suspends until they answer or the
    /// platform resolves on its own.
    fn request_permission(&self) -> impl Future<Output = Result<Permission, PlatformError>> + Send;

    /// Show a native notification.
    fn show(&self, title: &str, body: &str) -> Result<(), PlatformError>;
}

/// Permission-aware notification sender bound to a store.
pub struct Notifier<P> {
    platform: P,
    store: AppStore,
    permission: watch::Sender<Permission>,
}

impl<P: NotificationPlatform> Notifier<P> {
    /// Wrap `platform`, reading its current permission if it is supported.
    pub fn new(platform: P, store: AppStore) -> Self {
        let initial = if platform.is_supported() {
            platform.permission()
        } else {
            Permission::Default
        };
        let (permission, _) = watch::channel(initial);
        Self {
            platform,
            store,
            permission,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    /// Last known permission.
    pub fn permission(&self) -> Permission {
        *self.permission.borrow()
    }

    /// Observe permission changes.
    pub fn subscribe_permission(&self) -> watch::Receiver<Permission> {
        self.permission.subscribe()
    }

    /// Ask for permission.
    ///
    /// Resolves to [`Permission::Denied`] when notifications are unsupported
    /// or the platform request fails; platform errors are logged, never
    /// returned.
    pub async fn request_permission(&self) -> Permission {
        if !self.platform.is_supported() {
            return Permission::Denied;
        }
        let result = match self.platform.request_permission().await {
            Ok(permission) => permission,
            Err(e) => {
                tracing::warn!(error = %e, "notification permission request failed");
                Permission::Denied
            }
        };
        self.permission.send_replace(result);
        result
    }

    /// Show a native notification and log it in the store.
    ///
    /// Does nothing unless notifications are supported and granted. If the
    /// platform fails to show it, nothing is logged either.
    ///
    /// Returns `true` if the notification was shown.
    pub fn send_notification(&self, title: &str, body: &str) -> bool {
        if !self.platform.is_supported() || self.permission() != Permission::Granted {
            return false;
        }
        if let Err(e) = self.platform.show(title, body) {
            tracing::warn!(title, error = %e, "failed to show native notification");
            return false;
        }
        self.store.add_notification(Notification::just_now(
            NotificationKind::StatusUpdate,
            title,
            body,
        ));
        true
    }
}
