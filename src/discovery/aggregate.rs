//! Folding the event x participant fan-out into event details

use std::collections::HashMap;
use crate::models::{Event, EventDetail, EventParticipantRow, EventStatus, GeoPoint, UserSummary};

/// Accumulates fan-out rows into one [`EventDetail`] per distinct event id
#[derive(Debug)]
pub struct EventAggregator {
    requesting_user_id: i64,
    order: Vec<i64>,
    details: HashMap<i64, EventDetail>,
}

impl EventAggregator {
    pub fn new(requesting_user_id: i64) -> Self {
        Self {
            requesting_user_id,
            order: Vec::new(),
            details: HashMap::new(),
        }
    }

    /// Fold one row; the first row of an event seeds it, every row with a
    /// participant appends to it.
    pub fn push(&mut self, row: EventParticipantRow) {
        let requesting_user_id = self.requesting_user_id;
        let event_id = row.id;

        if !self.details.contains_key(&event_id) {
            self.order.push(event_id);
        }
        let detail = self
            .details
            .entry(event_id)
            .or_insert_with(|| seed_detail(&row, requesting_user_id));

        let (Some(participant_id), Some(username)) = (row.participant_id, row.participant_username) else {
            return;
        };

        if detail.participants.iter().any(|p| p.user_id == participant_id) {
            return;
        }

        detail.participants.push(UserSummary {
            user_id: participant_id,
            username,
            preferred_name: row.participant_preferred_name,
            profile_icon_url: row.participant_profile_icon_url,
        });
        detail.status = EventStatus::derive(
            detail.event.deleted,
            detail.participants.len(),
            detail.event.max_participant_count,
        );

        if participant_id == requesting_user_id {
            detail.is_joined = true;
        }
    }

    /// Details in ascending distance; events without a distance keep arrival order
    pub fn finish(self) -> Vec<EventDetail> {
        let Self { order, mut details, .. } = self;

        let mut events: Vec<EventDetail> = order
            .into_iter()
            .filter_map(|id| details.remove(&id))
            .collect();

        events.sort_by(|a, b| {
            let a = a.distance.unwrap_or(f64::INFINITY);
            let b = b.distance.unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });
        events
    }
}

/// Fold a whole row stream
pub fn fold_rows<I>(rows: I, requesting_user_id: i64) -> Vec<EventDetail>
where
    I: IntoIterator<Item = EventParticipantRow>,
{
    let mut aggregator = EventAggregator::new(requesting_user_id);
    for row in rows {
        aggregator.push(row);
    }
    aggregator.finish()
}

fn seed_detail(row: &EventParticipantRow, requesting_user_id: i64) -> EventDetail {
    EventDetail {
        event: Event {
            id: row.id,
            event_name: row.event_name.clone(),
            host_id: row.host_id,
            start_time: row.start_time.clone(),
            end_time: row.end_time.clone(),
            destination: row.destination.clone(),
            long_lat: GeoPoint::new(row.longitude, row.latitude),
            event_type: row.event_type.clone(),
            max_participant_count: row.max_participant_count,
            description: row.description.clone(),
            deleted: row.deleted,
        },
        host: UserSummary {
            user_id: row.host_id,
            username: row.host_username.clone(),
            preferred_name: row.host_preferred_name.clone(),
            profile_icon_url: row.host_profile_icon_url.clone(),
        },
        is_host: row.host_id == requesting_user_id,
        is_joined: false,
        status: EventStatus::derive(row.deleted, 0, row.max_participant_count),
        participants: Vec::new(),
        distance: row.distance,
    }
}
