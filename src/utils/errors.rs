//! Error handling for Kickabout
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for Kickabout application
#[derive(Error, Debug)]
pub enum KickaboutError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Push delivery error: {0}")]
    Push(#[from] PushError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Event {event_id} changed before the join landed, refresh and retry")]
    StaleInfo { event_id: i64 },

    #[error("User {user_id} already joined event {event_id}")]
    AlreadyJoined { event_id: i64, user_id: i64 },

    #[error("Hosting quota exhausted for user {user_id}, refreshes in {refresh_in_min} min")]
    HostingQuotaExceeded { user_id: i64, refresh_in_min: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Push delivery specific errors
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Push request failed: {0}")]
    RequestFailed(String),

    #[error("Push request timeout")]
    Timeout,

    #[error("Invalid push response: {0}")]
    InvalidResponse(String),

    #[error("Push service unavailable")]
    ServiceUnavailable,
}

/// Result type alias for Kickabout operations
pub type Result<T> = std::result::Result<T, KickaboutError>;

/// Result type alias for push operations
pub type PushResult<T> = std::result::Result<T, PushError>;

impl KickaboutError {
    /// Connectivity and timeout failures the HTTP layer may retry
    pub fn is_transient(&self) -> bool {
        match self {
            KickaboutError::Database(sqlx::Error::Database(db)) => {
                db.code().is_some_and(|code| is_transient_sqlstate(&code))
            }
            KickaboutError::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed
            ),
            KickaboutError::Io(_) => true,
            KickaboutError::Push(PushError::Timeout) | KickaboutError::Push(PushError::ServiceUnavailable) => true,
            _ => false,
        }
    }

    /// Errors caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// HTTP status a request handler should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            KickaboutError::Validation(_) | KickaboutError::MalformedCursor(_) => 400,
            KickaboutError::PermissionDenied(_) => 403,
            KickaboutError::UserNotFound { .. } | KickaboutError::EventNotFound { .. } => 404,
            KickaboutError::StaleInfo { .. }
            | KickaboutError::AlreadyJoined { .. }
            | KickaboutError::Conflict(_) => 409,
            KickaboutError::HostingQuotaExceeded { .. } => 429,
            e if e.is_transient() => 503,
            _ => 500,
        }
    }

    /// Stable client-visible code; distinguishes stale info from other conflicts
    pub fn error_code(&self) -> u32 {
        match self {
            KickaboutError::Validation(_) => 1001,
            KickaboutError::MalformedCursor(_) => 1002,
            KickaboutError::PermissionDenied(_) => 1003,
            KickaboutError::UserNotFound { .. } => 1004,
            KickaboutError::EventNotFound { .. } => 1005,
            KickaboutError::StaleInfo { .. } => 1006,
            KickaboutError::AlreadyJoined { .. } => 1007,
            KickaboutError::HostingQuotaExceeded { .. } => 1008,
            KickaboutError::Conflict(_) => 1009,
            e if e.is_transient() => 1503,
            _ => 1500,
        }
    }

    /// Message safe to show a client; server-side failures are generalized
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            "Server encountered an unknown error. Please try again later".to_string()
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            KickaboutError::Database(_) => ErrorSeverity::Critical,
            KickaboutError::Migration(_) => ErrorSeverity::Critical,
            KickaboutError::Config(_) | KickaboutError::ConfigSource(_) => ErrorSeverity::Critical,
            KickaboutError::PermissionDenied(_) => ErrorSeverity::Warning,
            KickaboutError::StaleInfo { .. } => ErrorSeverity::Info,
            KickaboutError::HostingQuotaExceeded { .. } => ErrorSeverity::Warning,
            KickaboutError::Push(_) => ErrorSeverity::Warning,
            KickaboutError::Validation(_) | KickaboutError::MalformedCursor(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Statement timeout, lock timeout, serialization failure and deadlock
const TRANSIENT_SQLSTATES: [&str; 4] = ["57014", "55P03", "40001", "40P01"];

/// Whether a PostgreSQL SQLSTATE describes a failure worth retrying
pub fn is_transient_sqlstate(code: &str) -> bool {
    TRANSIENT_SQLSTATES.contains(&code)
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
