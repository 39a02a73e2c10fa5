//! Hosting quota model
//!
//! Per-user counters plus the refresh-window transition rule. The transition
//! is pure so the repository can apply it inside whatever transaction holds
//! the counter row lock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::config::HostingConfig;

/// Stored counters for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct HostingCounters {
    pub host_count: i32,
    pub last_refresh_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HostingStatus {
    Valid,
    Invalid,
}

/// Quota view returned to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingConfigInfo {
    pub host_count: i32,
    pub max_host_count: i32,
    pub refresh_in_min: i64,
    pub status: HostingStatus,
}

impl HostingConfigInfo {
    pub fn is_valid(&self) -> bool {
        self.status == HostingStatus::Valid
    }
}

/// Outcome of applying the transition rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostingTransition {
    pub counters: HostingCounters,
    pub refreshed: bool,
    /// Whether the stored row must be rewritten
    pub changed: bool,
}

impl HostingCounters {
    /// Apply the refresh-window rule.
    ///
    /// An elapsed window resets the count to 0 (or 1 when this call records a
    /// hosting) and restarts the window at `now`; otherwise a hosting bumps the
    /// count and leaves the window untouched.
    pub fn advance(self, config: &HostingConfig, did_just_host: bool, now: DateTime<Utc>) -> HostingTransition {
        let period = Duration::minutes(config.refresh_period_minutes);
        let refreshed = now - self.last_refresh_time >= period;

        let counters = if refreshed {
            HostingCounters {
                host_count: if did_just_host { 1 } else { 0 },
                last_refresh_time: now,
            }
        } else if did_just_host {
            HostingCounters {
                host_count: self.host_count + 1,
                last_refresh_time: self.last_refresh_time,
            }
        } else {
            self
        };

        HostingTransition {
            counters,
            refreshed,
            changed: refreshed || did_just_host,
        }
    }

    /// Summarise the counters against the configured ceiling
    pub fn info(&self, config: &HostingConfig, now: DateTime<Utc>) -> HostingConfigInfo {
        let next_refresh = self.last_refresh_time + Duration::minutes(config.refresh_period_minutes);
        let status = if self.host_count < config.max_count {
            HostingStatus::Valid
        } else {
            HostingStatus::Invalid
        };

        HostingConfigInfo {
            host_count: self.host_count,
            max_host_count: config.max_count,
            refresh_in_min: (next_refresh - now).num_minutes(),
            status,
        }
    }
}
