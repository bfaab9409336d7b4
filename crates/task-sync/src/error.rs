//! Sync Errors
//!
//! Failures coming back from the remote store, the realtime stream or the
//! local cache, classified as transient (worth retrying) or fatal.

use thiserror::Error;

/// Common result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Whether an error is worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Transport failure (offline, DNS, connection reset)
    #[error("{0}")]
    Network(String),

    /// Non-success HTTP status from the store's REST endpoint
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The store rejected the request or cancelled the listener
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Credentials expired while a listener was open
    #[error("Authentication revoked")]
    AuthRevoked,

    /// Payload could not be parsed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Local cache slot unreadable or unwritable
    #[error("Cache error: {0}")]
    Cache(String),

    /// Realtime stream ended without an error
    #[error("Stream closed")]
    StreamClosed,

    /// Reconnect policy gave up
    #[error("Gave up reconnecting after {0} attempts")]
    RetriesExhausted(u32),
}

impl SyncError {
    /// Map an HTTP status code into an error
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => SyncError::PermissionDenied(message),
            _ => SyncError::Http { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Network(_) | SyncError::StreamClosed => ErrorKind::Transient,
            SyncError::Http { status, .. } => match status {
                408 | 429 | 500..=599 => ErrorKind::Transient,
                _ => ErrorKind::Fatal,
            },
            SyncError::PermissionDenied(_)
            | SyncError::AuthRevoked
            | SyncError::Decode(_)
            | SyncError::Cache(_)
            | SyncError::RetriesExhausted(_) => ErrorKind::Fatal,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Decode(e.to_string())
    }
}
