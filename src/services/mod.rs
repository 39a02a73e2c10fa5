//! Services module
//!
//! Business logic on top of the repositories

pub mod catalog;
pub mod events;
pub mod notification;
pub mod push;

pub use catalog::{SportCatalog, SportDetail};
pub use events::EventService;
pub use notification::NotificationService;
pub use push::{DisabledPush, FcmClient, PushSink};

use std::sync::Arc;
use tracing::info;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and wiring all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub notification_service: NotificationService,
    pub catalog: Arc<SportCatalog>,
}

impl ServiceFactory {
    /// Build all services, loading the sport catalog from disk
    pub async fn new(settings: &Settings, db: DatabaseService) -> Result<Self> {
        let catalog = SportCatalog::load(&settings.catalog.path).await?;

        let sink: Arc<dyn PushSink> = if settings.push.enabled {
            Arc::new(FcmClient::new(&settings.push)?)
        } else {
            info!("Push delivery disabled");
            Arc::new(DisabledPush)
        };

        Ok(Self::with_parts(settings, db, sink, catalog))
    }

    /// Wire services from already constructed parts
    pub fn with_parts(settings: &Settings, db: DatabaseService, sink: Arc<dyn PushSink>, catalog: SportCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let notification_service = NotificationService::new(db.clone(), sink);
        let event_service = EventService::new(
            db,
            notification_service.clone(),
            Arc::clone(&catalog),
            settings.discovery.clone(),
        );

        Self {
            event_service,
            notification_service,
            catalog,
        }
    }
}
