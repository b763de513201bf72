//! Client-side state for the CivicFix civic issue reporter.

mod action;
pub use action::{Action, AppState};
pub mod adapters;
mod error;
pub mod intent;
mod model;
mod persist;
pub mod query;
pub mod seed;
mod storage;
mod store;

pub use error::{PersistError, PlatformError};
pub use model::{
    Category, ImageRef, Issue, IssueStatus, JUST_NOW, Notification, NotificationKind, Priority,
    StatsDelta, User,
};
pub use persist::{PersistedState, STATE_VERSION, load_state, save_state};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{AppStore, AppStoreBuilder, DEFAULT_STORAGE_KEY, Listener, SubscriptionId};
