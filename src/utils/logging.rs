//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Kickabout application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{KickaboutError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(stdout_layer)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| KickaboutError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event management actions
pub fn log_event_action(event_id: i64, action: &str, user_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log hosting quota transitions
pub fn log_hosting_update(user_id: i64, host_count: i32, refreshed: bool, status: &str) {
    debug!(
        user_id = user_id,
        host_count = host_count,
        refreshed = refreshed,
        status = status,
        "Hosting config updated"
    );
}

/// Log the outcome of a detached push dispatch
pub fn log_push_dispatch(event_id: i64, kind: &str, token_count: usize, error: Option<&str>) {
    match error {
        None => debug!(
            event_id = event_id,
            kind = kind,
            token_count = token_count,
            "Push notification dispatched"
        ),
        Some(error) => warn!(
            event_id = event_id,
            kind = kind,
            token_count = token_count,
            error = error,
            "Push notification dispatch failed"
        ),
    }
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
