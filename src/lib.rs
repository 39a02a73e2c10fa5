//! Kickabout
//!
//! Backend core for a sports meetup application: nearby event discovery with
//! distance-keyed cursor pagination, capacity-guarded joins, a per-host
//! hosting quota and detached participant push notifications.

pub mod config;
pub mod database;
pub mod discovery;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Settings;
pub use database::DatabaseService;
pub use discovery::{Cursor, Filter};
pub use services::{EventService, ServiceFactory};
pub use utils::errors::{KickaboutError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `name vX.Y.Z`, used in the startup log line
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
