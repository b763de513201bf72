//! Crate-level error types for persistence and platform capabilities.

/// Error returned when the persisted snapshot cannot be written.
///
/// The store swallows these during normal operation (the in-memory state
/// stays authoritative) and only surfaces them from
/// [`AppStore::close`](crate::AppStore::close).
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The storage backend failed to read or write.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be encoded as JSON.
    #[error("snapshot encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure reported by a platform capability (notifications, clipboard,
/// share sheet, install prompt).
///
/// Adapters log these and translate them into their own outcome types; they
/// never reach the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The capability does not exist on this platform.
    #[error("capability not supported on this platform")]
    Unsupported,

    /// The user or platform refused the request.
    #[error("request was denied")]
    Denied,

    /// The user dismissed a sheet or prompt without completing it.
    #[error("request was aborted by the user")]
    Aborted,

    /// Any other platform failure, with its message.
    #[error("platform error: {0}")]
    Other(String),
}
