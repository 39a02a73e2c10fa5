//! Push notification model

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Event state changes participants are told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ParticipantJoined,
    ParticipantLeft,
    EventUpdated,
    EventCancelled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ParticipantJoined => "participant_joined",
            NotificationKind::ParticipantLeft => "participant_left",
            NotificationKind::EventUpdated => "event_updated",
            NotificationKind::EventCancelled => "event_cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl PushPayload {
    /// Build the payload for a change on `event_name` made by `actor`
    pub fn for_event(kind: NotificationKind, event_id: i64, event_name: &str, actor: &str) -> Self {
        let (title, body) = match kind {
            NotificationKind::ParticipantJoined => (
                format!("{} has a new player", event_name),
                format!("{} joined {}", actor, event_name),
            ),
            NotificationKind::ParticipantLeft => (
                format!("A spot opened in {}", event_name),
                format!("{} left {}", actor, event_name),
            ),
            NotificationKind::EventUpdated => (
                format!("{} was updated", event_name),
                format!("{} changed the time or details of {}", actor, event_name),
            ),
            NotificationKind::EventCancelled => (
                format!("{} was cancelled", event_name),
                format!("{} cancelled {}", actor, event_name),
            ),
        };

        let mut data = HashMap::new();
        data.insert("eventId".to_string(), event_id.to_string());
        data.insert("kind".to_string(), kind.as_str().to_string());

        Self { title, body, data }
    }
}
