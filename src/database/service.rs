//! Database service layer
//!
//! Bundles the repositories over one pool

use crate::config::HostingConfig;
use crate::database::{DatabasePool, UserRepository, EventRepository, HostingRepository, MessagingRepository};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub events: EventRepository,
    pub hosting: HostingRepository,
    pub messaging: MessagingRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool, hosting: HostingConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            hosting: HostingRepository::new(pool.clone(), hosting),
            messaging: MessagingRepository::new(pool.clone()),
            pool,
        }
    }

    /// Pool for work that spans several repositories in one transaction
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}
