//! Event service
//!
//! Orchestrates the event repository, the hosting quota and participant
//! notifications. Input validation lives here; the repositories assume
//! well-formed requests.

use std::sync::Arc;
use chrono::{DateTime, FixedOffset};
use tracing::info;
use crate::config::DiscoveryConfig;
use crate::database::DatabaseService;
use crate::discovery::Filter;
use crate::models::event::{
    CreateEventRequest, Event, EventDetail, EventDetailResponse, EventHistoryEntry, UpdateEventRequest,
    UserScheduledEventsResponse,
};
use crate::models::hosting::HostingConfigInfo;
use crate::models::notification::NotificationKind;
use crate::services::catalog::SportCatalog;
use crate::services::notification::NotificationService;
use crate::utils::errors::{KickaboutError, Result};
use crate::utils::logging::log_event_action;

#[derive(Clone, Debug)]
pub struct EventService {
    db: DatabaseService,
    notifications: NotificationService,
    catalog: Arc<SportCatalog>,
    discovery: DiscoveryConfig,
}

impl EventService {
    pub fn new(
        db: DatabaseService,
        notifications: NotificationService,
        catalog: Arc<SportCatalog>,
        discovery: DiscoveryConfig,
    ) -> Self {
        Self {
            db,
            notifications,
            catalog,
            discovery,
        }
    }

    /// Next page of nearby upcoming events
    pub async fn get_events(&self, filter: Filter, requesting_user_id: i64) -> Result<EventDetailResponse> {
        let validated = filter.validate(&self.discovery)?;
        self.db.events.get_events(&validated, requesting_user_id).await
    }

    pub async fn get_event_by_id(&self, event_id: i64, requesting_user_id: i64) -> Result<EventDetail> {
        self.db.events.get_event_by_id(event_id, requesting_user_id).await
    }

    /// Join an event. A lost capacity race comes back as `StaleInfo`.
    pub async fn join_event(&self, event_id: i64, user_id: i64) -> Result<()> {
        if let Err(e) = self.db.events.join_event(event_id, user_id).await {
            if matches!(e, KickaboutError::StaleInfo { .. }) {
                info!(event_id = event_id, user_id = user_id, "Join lost capacity race");
            }
            return Err(e);
        }

        log_event_action(event_id, "join", user_id, None);
        self.notifications.notify_participants(event_id, user_id, NotificationKind::ParticipantJoined);
        Ok(())
    }

    /// Leave an event. Leaving an event one is not part of is a no-op.
    pub async fn quit_event(&self, event_id: i64, user_id: i64) -> Result<()> {
        if self.db.events.quit_event(event_id, user_id).await? {
            log_event_action(event_id, "quit", user_id, None);
            self.notifications.notify_participants(event_id, user_id, NotificationKind::ParticipantLeft);
        }

        Ok(())
    }

    /// Create an event, charging the host's quota in the same transaction
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        validate_create(&request)?;

        let mut tx = self.db.pool().begin().await?;

        let quota = self.db.hosting.get_or_update_in(&mut *tx, request.host_id, false).await?;
        if !quota.is_valid() {
            tx.rollback().await?;
            return Err(KickaboutError::HostingQuotaExceeded {
                user_id: request.host_id,
                refresh_in_min: quota.refresh_in_min,
            });
        }

        let event = self.db.events.create_in(&mut *tx, &request).await?;
        self.db.hosting.get_or_update_in(&mut *tx, request.host_id, true).await?;
        tx.commit().await?;

        log_event_action(event.id, "create", event.host_id, Some(&event.event_type));
        Ok(event)
    }

    /// Host-only edit of time and description
    pub async fn update_event(&self, request: UpdateEventRequest) -> Result<Event> {
        validate_times(&request.start_time, &request.end_time)?;

        let event = self.db.events.update_event(&request).await?;
        log_event_action(event.id, "update", request.host_id, None);
        self.notifications.notify_participants(event.id, request.host_id, NotificationKind::EventUpdated);

        Ok(event)
    }

    /// Host-only soft delete; cancelling twice is a no-op
    pub async fn cancel_event(&self, event_id: i64, host_id: i64) -> Result<()> {
        if !self.db.events.cancel_event(event_id, host_id).await? {
            return Ok(());
        }

        log_event_action(event_id, "cancel", host_id, None);
        self.notifications.notify_participants(event_id, host_id, NotificationKind::EventCancelled);
        Ok(())
    }

    /// Read the hosting quota, optionally recording a hosting
    pub async fn update_hosting_config(&self, user_id: i64, did_just_host: bool) -> Result<HostingConfigInfo> {
        self.db.hosting.get_or_update(user_id, did_just_host).await
    }

    /// Not yet ended events the user takes part in, with sport artwork
    pub async fn get_user_events(&self, user_id: i64) -> Result<UserScheduledEventsResponse> {
        let mut user_events = self.db.events.get_user_events(user_id).await?;
        for event in &mut user_events {
            event.sport_image_url = self
                .catalog
                .image_url_for(&event.event_type)
                .unwrap_or_default()
                .to_string();
        }

        Ok(UserScheduledEventsResponse { user_events })
    }

    pub async fn get_history(&self, user_id: i64, page_number: i64, page_size: i64) -> Result<Vec<EventHistoryEntry>> {
        if page_size > self.discovery.max_page_size {
            return Err(KickaboutError::Validation(format!(
                "pageSize must not exceed {}", self.discovery.max_page_size
            )));
        }

        self.db.events.get_history(user_id, page_number, page_size).await
    }

    pub async fn get_user_joined_event_count(&self, user_id: i64) -> Result<i64> {
        self.db.events.get_user_joined_event_count(user_id).await
    }

    pub async fn get_mutual_joined_event_count(&self, user_id: i64, other_user_id: i64) -> Result<i64> {
        self.db.events.get_mutual_joined_event_count(user_id, other_user_id).await
    }

    /// Register the device the user wants event pushes on
    pub async fn register_push_token(&self, user_id: i64, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(KickaboutError::Validation("Push token must not be empty".to_string()));
        }

        self.db.messaging.upsert_token(user_id, token).await
    }

    pub async fn unregister_push_token(&self, user_id: i64) -> Result<()> {
        self.db.messaging.remove_token(user_id).await
    }
}

fn parse_time(field: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|e| {
        KickaboutError::Validation(format!("{} must be an RFC 3339 timestamp: {}", field, e))
    })
}

fn validate_times(start_time: &str, end_time: &str) -> Result<()> {
    let start = parse_time("startTime", start_time)?;
    let end = parse_time("endTime", end_time)?;
    if end < start {
        return Err(KickaboutError::Validation("endTime must not be before startTime".to_string()));
    }

    Ok(())
}

fn validate_create(request: &CreateEventRequest) -> Result<()> {
    let mut problems = Vec::new();

    if request.event_name.trim().is_empty() {
        problems.push("eventName must not be empty".to_string());
    }
    if request.event_type.trim().is_empty() {
        problems.push("eventType must not be empty".to_string());
    }
    if request.max_participant_count < 1 {
        problems.push("maxParticipantCount must be at least 1".to_string());
    }
    if !request.long_lat.is_valid() {
        problems.push("longLat is out of range".to_string());
    }
    if let Err(KickaboutError::Validation(msg)) = validate_times(&request.start_time, &request.end_time) {
        problems.push(msg);
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(KickaboutError::Validation(problems.join("; ")))
    }
}
