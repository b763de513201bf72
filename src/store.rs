//! The application state store and its builder.
//!
//! [`AppStore`] owns the single in-process [`AppState`]. Every mutation runs
//! the pure [`AppState::apply`] transition, writes the new snapshot to the
//! configured [`KeyValueStorage`] slot, then notifies subscribers. The store
//! is opened via [`AppStoreBuilder`], which restores any previously
//! persisted snapshot before the store is handed out.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::action::{Action, AppState};
use crate::error::PersistError;
use crate::model::{Issue, Notification, StatsDelta, User};
use crate::persist::{load_state, save_state};
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// Storage key the snapshot is written under unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "civicfix-storage";

/// Callback invoked with the new snapshot after each state change.
pub type Listener = Arc<dyn Fn(&AppState) + Send + Sync>;

/// Handle returned by [`AppStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Single source of truth for the user, issues and notifications.
///
/// `Clone` is cheap: all clones share the same state, storage and
/// subscribers. Views hold clones and read owned snapshots; the store's
/// own methods are the only write path.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: RwLock<AppState>,
    seed: AppState,
    storage: Arc<dyn KeyValueStorage>,
    storage_key: String,
    listeners: RwLock<BTreeMap<SubscriptionId, Listener>>,
    next_id: AtomicU64,
}

// Manual `Debug` because listeners and the storage trait object are not `Debug`.
impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("storage_key", &self.inner.storage_key)
            .finish()
    }
}

impl AppStore {
    /// Start configuring a store.
    pub fn builder() -> AppStoreBuilder {
        AppStoreBuilder::new()
    }

    /// A session-only store seeded with the default data.
    pub fn in_memory() -> Self {
        AppStoreBuilder::new().open()
    }

    /// Prepend an issue. The caller supplies a unique id and a non-empty
    /// image list; neither is checked here.
    pub fn add_issue(&self, issue: Issue) {
        self.dispatch(Action::AddIssue(issue));
    }

    /// Prepend a notification.
    pub fn add_notification(&self, notification: Notification) {
        self.dispatch(Action::AddNotification(notification));
    }

    /// Mark the notification with this exact id as read.
    ///
    /// Unknown ids are ignored.
    pub fn mark_notification_as_read(&self, id: &str) {
        self.dispatch(Action::MarkNotificationAsRead { id: id.to_owned() });
    }

    /// Add signed deltas to the user's counters.
    pub fn update_user_stats(&self, delta: StatsDelta) {
        self.dispatch(Action::UpdateUserStats(delta));
    }

    /// Reset user, issues and notifications to the seed (sign-out).
    ///
    /// The seed is always written to storage, even when memory already
    /// holds it, so a session the store failed to load at open is
    /// overwritten too.
    pub fn clear_all_data(&self) {
        self.dispatch(Action::ClearAllData);
    }

    /// Apply `action`, persist the result and notify subscribers.
    ///
    /// The write lock is held across the transition and the storage write,
    /// so the durable copy is updated in the same step as memory. A storage
    /// failure is logged and otherwise ignored. Actions that leave the state
    /// unchanged are not broadcast, and are not persisted either, except
    /// [`Action::ClearAllData`], which always rewrites storage.
    ///
    /// # Arguments
    ///
    /// * `action` - The mutation to apply.
    ///
    /// # Returns
    ///
    /// `true` if the in-memory state changed.
    pub fn dispatch(&self, action: Action) -> bool {
        let _span = tracing::debug_span!("dispatch", action = action.name()).entered();

        let always_persist = matches!(action, Action::ClearAllData);
        let next = {
            let mut state = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
            let next = match action {
                // The configured seed may differ from the built-in one.
                Action::ClearAllData => self.inner.seed.clone(),
                ref other => state.clone().apply(other),
            };
            if next == *state {
                tracing::debug!("action left state unchanged");
                if always_persist {
                    self.persist(&state);
                }
                return false;
            }
            *state = next.clone();
            self.persist(&state);
            next
        };

        self.notify(&next);
        true
    }

    /// An owned copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.read().clone()
    }

    /// The signed-in user's profile and counters.
    pub fn user(&self) -> User {
        self.read().user.clone()
    }

    /// Every issue, most recent first.
    pub fn issues(&self) -> Vec<Issue> {
        self.read().issues.clone()
    }

    /// Every notification, most recent first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.read().notifications.clone()
    }

    /// Look up an issue by id.
    pub fn issue(&self, id: &str) -> Option<Issue> {
        self.read().issues.iter().find(|i| i.id == id).cloned()
    }

    /// Number of notifications not yet read; drives the bell badge.
    pub fn unread_count(&self) -> usize {
        self.read().unread_count()
    }

    /// Register a listener called after every state change.
    ///
    /// Listeners run synchronously on the dispatching thread, after the
    /// store has released its state lock, so they may read the store.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.insert(id, Arc::new(listener));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.remove(&id);
    }

    /// The storage key this store writes under.
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// The seed state [`clear_all_data`](Self::clear_all_data) resets to.
    pub fn seed(&self) -> &AppState {
        &self.inner.seed
    }

    /// Write the current snapshot one last time and drop all listeners.
    ///
    /// Unlike mutations, which swallow storage failures, this reports the
    /// outcome so shutdown code can surface it.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the final write fails.
    pub fn close(&self) -> Result<(), PersistError> {
        let state = self.read();
        let result = save_state(self.inner.storage.as_ref(), &self.inner.storage_key, &state);
        drop(state);
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!(key = %self.inner.storage_key, ok = result.is_ok(), "store closed");
        result
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, AppState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &AppState) {
        if let Err(e) = save_state(self.inner.storage.as_ref(), &self.inner.storage_key, state) {
            tracing::warn!(
                key = %self.inner.storage_key,
                error = %e,
                "failed to persist state; continuing in memory"
            );
        }
    }

    fn notify(&self, state: &AppState) {
        // Clone the handlers out so listeners can (un)subscribe re-entrantly.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(state);
        }
    }
}

/// Builder for configuring and opening an [`AppStore`].
///
/// Defaults: storage key [`DEFAULT_STORAGE_KEY`], session-only
/// [`MemoryStorage`], and the standard seed data.
///
/// # Examples
///
/// ```no_run
/// use civicfix::AppStore;
///
/// let store = AppStore::builder()
///     .base_dir("/tmp/civicfix")
///     .open();
/// assert_eq!(store.storage_key(), "civicfix-storage");
/// ```
pub struct AppStoreBuilder {
    storage_key: String,
    base_dir: Option<PathBuf>,
    storage: Option<Arc<dyn KeyValueStorage>>,
    seed: AppState,
}

impl AppStoreBuilder {
    pub fn new() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            base_dir: None,
            storage: None,
            seed: AppState::seed(),
        }
    }

    /// Persist to JSON files under `path` via [`FileStorage`].
    ///
    /// Ignored if [`storage`](Self::storage) is also set.
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(path.into());
        self
    }

    /// Use a custom storage backend.
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Override the key the snapshot is stored under.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Replace the seed used for first launch and for
    /// [`AppStore::clear_all_data`].
    pub fn seed(mut self, seed: AppState) -> Self {
        self.seed = seed;
        self
    }

    /// Open the store.
    ///
    /// If the storage slot holds a valid snapshot it replaces the seed;
    /// otherwise the store starts from the seed. Opening never fails: an
    /// unreadable slot is logged and treated as empty.
    pub fn open(self) -> AppStore {
        let storage: Arc<dyn KeyValueStorage> = match (self.storage, self.base_dir) {
            (Some(storage), _) => storage,
            (None, Some(dir)) => Arc::new(FileStorage::new(dir)),
            (None, None) => Arc::new(MemoryStorage::new()),
        };

        let restored = load_state(storage.as_ref(), &self.storage_key);
        tracing::info!(
            key = %self.storage_key,
            restored = restored.is_some(),
            "opening application store"
        );
        let state = restored.unwrap_or_else(|| self.seed.clone());

        AppStore {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                seed: self.seed,
                storage,
                storage_key: self.storage_key,
                listeners: RwLock::new(BTreeMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }
}

impl Default for AppStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_fixtures::{issue, notification};
    use crate::model::{ImageRef, Issue};
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicBool;

    /// Storage whose reads and writes always fail.
    struct UnavailableStorage;

    impl KeyValueStorage for UnavailableStorage {
        fn get(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "private mode"))
        }
        fn set(&self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "quota exceeded"))
        }
        fn remove(&self, _key: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "private mode"))
        }
    }

    /// Memory-backed storage whose first read fails.
    struct FlakyReadStorage {
        inner: MemoryStorage,
        failed: AtomicBool,
    }

    impl FlakyReadStorage {
        fn new() -> Self {
            Self {
                inner: MemoryStorage::new(),
                failed: AtomicBool::new(false),
            }
        }
    }

    impl KeyValueStorage for FlakyReadStorage {
        fn get(&self, key: &str) -> io::Result<Option<String>> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "transient read failure"));
            }
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> io::Result<()> {
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> io::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn fresh_store_holds_seed() {
        let store = AppStore::in_memory();
        assert_eq!(store.snapshot(), AppState::seed());
        assert_eq!(store.unread_count(), 2);
        assert_eq!(store.storage_key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn add_issue_scenario_with_placeholder() {
        let store = AppStore::in_memory();
        let submitted = Issue {
            id: "X1".into(),
            title: "Pothole".into(),
            images: vec![],
            reported_by: "Tester".into(),
            ..issue("X1")
        }
        .with_placeholder_if_empty();

        store.add_issue(submitted);

        let first = store.issues().into_iter().next().expect("issue present");
        assert_eq!(first.id, "X1");
        assert_eq!(first.images, vec![ImageRef::placeholder()]);
    }

    #[test]
    fn update_user_stats_adds_points() {
        let store = AppStore::in_memory();
        store.update_user_stats(StatsDelta::points(25));
        assert_eq!(store.user().points, 365);
    }

    #[test]
    fn mark_read_and_lookup() {
        let store = AppStore::in_memory();
        store.mark_notification_as_read("2");
        assert_eq!(store.unread_count(), 1);
        assert!(store.issue("CIV-2024-002").is_some());
        assert!(store.issue("missing").is_none());
    }

    #[test]
    fn dispatch_reports_noop() {
        let store = AppStore::in_memory();
        assert!(!store.dispatch(Action::MarkNotificationAsRead {
            id: "nonexistent".into()
        }));
        assert!(store.dispatch(Action::AddNotification(notification("n1"))));
    }

    #[test]
    fn clones_share_state() {
        let store = AppStore::in_memory();
        let view = store.clone();
        store.add_notification(notification("shared"));
        assert_eq!(view.notifications()[0].id, "shared");
    }

    #[test]
    fn clear_all_data_uses_configured_seed() {
        let store = AppStore::builder().seed(AppState::empty()).open();
        store.add_issue(issue("A"));
        store.clear_all_data();
        assert_eq!(store.snapshot(), AppState::empty());
        assert_eq!(store.seed(), &AppState::empty());
    }

    #[test]
    fn mutations_persist_to_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = AppStore::builder().storage(storage.clone()).open();
        store.add_issue(issue("P1"));

        let persisted = load_state(storage.as_ref(), DEFAULT_STORAGE_KEY).expect("persisted");
        assert_eq!(persisted, store.snapshot());
    }

    #[test]
    fn reopen_restores_previous_session() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        {
            let store = AppStore::builder().base_dir(tmp.path()).open();
            store.add_issue(issue("S1"));
            store.update_user_stats(StatsDelta::points(10).with_reports(1));
        }

        let reopened = AppStore::builder().base_dir(tmp.path()).open();
        assert_eq!(reopened.issues()[0].id, "S1");
        assert_eq!(reopened.user().points, 350);
        assert_eq!(reopened.user().reports_count, 13);
    }

    #[test]
    fn custom_storage_key_is_isolated() {
        let storage = Arc::new(MemoryStorage::new());
        let a = AppStore::builder()
            .storage(storage.clone())
            .storage_key("a")
            .open();
        a.add_issue(issue("only-in-a"));

        let b = AppStore::builder().storage(storage).storage_key("b").open();
        assert_eq!(b.snapshot(), AppState::seed());
    }

    #[test]
    fn unavailable_storage_degrades_to_session_only() {
        let store = AppStore::builder()
            .storage(Arc::new(UnavailableStorage))
            .open();
        assert_eq!(store.snapshot(), AppState::seed());

        store.add_issue(issue("mem"));
        store.update_user_stats(StatsDelta::points(1));

        assert_eq!(store.issues()[0].id, "mem");
        assert_eq!(store.user().points, 341);
        assert!(store.close().is_err());
    }

    #[test]
    fn clear_after_failed_load_overwrites_stale_session() {
        let storage = Arc::new(FlakyReadStorage::new());
        let stale = AppState::seed()
            .apply(&Action::AddIssue(issue("old-session")))
            .apply(&Action::UpdateUserStats(StatsDelta::points(500)));
        save_state(storage.as_ref(), DEFAULT_STORAGE_KEY, &stale).expect("seed stale session");

        let store = AppStore::builder().storage(storage.clone()).open();
        assert_eq!(store.snapshot(), AppState::seed(), "failed read starts from seed");

        store.clear_all_data();

        assert_eq!(
            load_state(storage.as_ref(), DEFAULT_STORAGE_KEY),
            Some(AppState::seed())
        );
        let reopened = AppStore::builder().storage(storage).open();
        assert_eq!(reopened.snapshot(), AppState::seed());
    }

    #[test]
    fn clear_on_seed_state_does_not_notify() {
        let store = AppStore::in_memory();
        let calls = Arc::new(AtomicU64::new(0));
        let calls_c = calls.clone();
        store.subscribe(move |_| {
            calls_c.fetch_add(1, Ordering::Relaxed);
        });
        assert!(!store.dispatch(Action::ClearAllData));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn overflowing_delta_keeps_store_usable() {
        let store = AppStore::in_memory();
        store.update_user_stats(StatsDelta::points(i64::MAX));
        assert_eq!(store.user().points, i64::MAX);

        store.update_user_stats(StatsDelta::points(-1));
        assert_eq!(store.user().points, i64::MAX - 1);
    }

    #[test]
    fn close_flushes_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let store = AppStore::builder().storage(storage.clone()).open();
        store.close().expect("close should succeed");
        assert_eq!(
            load_state(storage.as_ref(), DEFAULT_STORAGE_KEY),
            Some(AppState::seed())
        );
    }

    #[test]
    fn subscribers_see_each_change() {
        let store = AppStore::in_memory();
        let seen = Arc::new(Mutex::new(Vec::<usize>::new()));
        let seen_c = seen.clone();
        let id = store.subscribe(move |state| {
            seen_c.lock().expect("lock").push(state.issues.len());
        });

        store.add_issue(issue("a"));
        store.mark_notification_as_read("nonexistent");
        store.add_issue(issue("b"));
        store.unsubscribe(id);
        store.add_issue(issue("c"));

        assert_eq!(*seen.lock().expect("lock"), vec![4, 5]);
    }

    #[test]
    fn listener_may_read_store() {
        let store = AppStore::in_memory();
        let reader = store.clone();
        let observed = Arc::new(Mutex::new(None));
        let observed_c = observed.clone();
        store.subscribe(move |_| {
            *observed_c.lock().expect("lock") = Some(reader.unread_count());
        });

        store.add_notification(notification("fresh"));
        assert_eq!(*observed.lock().expect("lock"), Some(3));
    }

    #[test]
    fn close_drops_listeners() {
        let store = AppStore::in_memory();
        let calls = Arc::new(AtomicU64::new(0));
        let calls_c = calls.clone();
        store.subscribe(move |_| {
            calls_c.fetch_add(1, Ordering::Relaxed);
        });
        store.close().expect("close");
        store.add_issue(issue("after-close"));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    const _: () = {
        #[allow(dead_code)]
        fn assert_send_sync<T: Send + Sync>() {}

        #[allow(dead_code)]
        fn check() {
            assert_send_sync::<AppStore>();
        }
    };
}
