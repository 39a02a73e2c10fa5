//! Participant notifications
//!
//! Dispatch is detached from the request that triggered it: callers hand over
//! ids and return immediately. Payload lookups and delivery happen in the
//! spawned task and their failures are only logged. All in-flight dispatches
//! are tracked so shutdown can drain them.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;
use crate::database::DatabaseService;
use crate::models::notification::{NotificationKind, PushPayload};
use crate::services::push::PushSink;
use crate::utils::errors::Result;
use crate::utils::logging::log_push_dispatch;

#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseService,
    sink: Arc<dyn PushSink>,
    tracker: TaskTracker,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("in_flight", &self.tracker.len())
            .finish()
    }
}

impl NotificationService {
    pub fn new(db: DatabaseService, sink: Arc<dyn PushSink>) -> Self {
        Self {
            db,
            sink,
            tracker: TaskTracker::new(),
        }
    }

    /// Tell everyone currently in the event that `actor_id` caused `kind`,
    /// without waiting for the payload to be built or delivered
    pub fn notify_participants(&self, event_id: i64, actor_id: i64, kind: NotificationKind) {
        if self.tracker.is_closed() {
            warn!(event_id = event_id, kind = kind.as_str(), "Notification dropped during shutdown");
            return;
        }

        let db = self.db.clone();
        let sink = Arc::clone(&self.sink);
        let dispatch_id = Uuid::new_v4();
        let span = tracing::info_span!("push_dispatch", %dispatch_id, event_id, actor_id, kind = kind.as_str());

        self.tracker.spawn(
            async move {
                let payload = match build_payload(&db, event_id, actor_id, kind).await {
                    Ok(Some(payload)) => payload,
                    Ok(None) => {
                        warn!("Event vanished before notification");
                        return;
                    }
                    Err(e) => {
                        log_push_dispatch(event_id, kind.as_str(), 0, Some(&e.to_string()));
                        return;
                    }
                };

                let tokens = match db.messaging.get_participant_tokens(event_id).await {
                    Ok(tokens) => tokens,
                    Err(e) => {
                        log_push_dispatch(event_id, kind.as_str(), 0, Some(&e.to_string()));
                        return;
                    }
                };

                if tokens.is_empty() {
                    debug!("No participant tokens registered");
                    return;
                }

                let error = sink.send(&tokens, &payload).await.err().map(|e| e.to_string());
                log_push_dispatch(event_id, kind.as_str(), tokens.len(), error.as_deref());
            }
            .instrument(span),
        );
    }

    /// Number of dispatches still running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting dispatches and wait for the running ones, up to `timeout`.
    /// Returns `false` if some were still running when the timeout hit.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending = pending, "Draining push notifications");
        }

        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(pending = self.tracker.len(), "Push drain timed out");
                false
            }
        }
    }
}

/// Load what the message needs; `None` when the event no longer exists
async fn build_payload(
    db: &DatabaseService,
    event_id: i64,
    actor_id: i64,
    kind: NotificationKind,
) -> Result<Option<PushPayload>> {
    let Some(event) = db.events.find_by_id(event_id).await? else {
        return Ok(None);
    };

    let actor = match db.users.find_by_id(actor_id).await? {
        Some(user) => user.display_name().to_string(),
        None => String::from("Someone"),
    };

    Ok(Some(PushPayload::for_event(kind, event.id, &event.event_name, &actor)))
}
