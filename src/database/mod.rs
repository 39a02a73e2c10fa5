//! Database module
//!
//! Connection pool, migrations and repositories

pub mod connection;
pub mod repositories;
pub mod service;

pub use connection::{DatabasePool, DatabaseConfig, create_pool, run_migrations, health_check};
pub use repositories::{UserRepository, EventRepository, HostingRepository, MessagingRepository};
pub use service::DatabaseService;
