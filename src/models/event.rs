//! Event model

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use crate::models::user::UserSummary;

/// Geographic point in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Longitude in [-180, 180] and latitude in [-90, 90]
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// Stored event. Start and end times are kept verbatim as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub event_name: String,
    #[serde(skip)]
    pub host_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub destination: String,
    pub long_lat: GeoPoint,
    pub event_type: String,
    pub max_participant_count: i32,
    pub description: String,
    #[serde(skip)]
    pub deleted: bool,
}

impl<'r> FromRow<'r, PgRow> for Event {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            event_name: row.try_get("event_name")?,
            host_id: row.try_get("host_id")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            destination: row.try_get("destination")?,
            long_lat: GeoPoint::new(row.try_get("longitude")?, row.try_get("latitude")?),
            event_type: row.try_get("event_type")?,
            max_participant_count: row.try_get("max_participant_count")?,
            description: row.try_get("description")?,
            deleted: row.try_get("deleted")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Available,
    Full,
    Cancel,
}

impl EventStatus {
    /// `Cancel` wins over capacity; otherwise `Full` iff the participant count reached the max
    pub fn derive(deleted: bool, participant_count: usize, max_participant_count: i32) -> Self {
        if deleted {
            EventStatus::Cancel
        } else if participant_count as i64 >= max_participant_count as i64 {
            EventStatus::Full
        } else {
            EventStatus::Available
        }
    }
}

/// Per-request view of an event: host, participants and viewer-relative flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub host: UserSummary,
    pub is_host: bool,
    pub is_joined: bool,
    pub status: EventStatus,
    pub participants: Vec<UserSummary>,
    /// Meters from the caller's reference point, when one was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailResponse {
    pub events: Vec<EventDetail>,
    pub next_cursor_id: String,
}

/// One row of the event x participant fan-out join
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EventParticipantRow {
    pub id: i64,
    pub event_name: String,
    pub host_id: i64,
    pub host_username: String,
    pub host_preferred_name: Option<String>,
    pub host_profile_icon_url: Option<String>,
    pub destination: String,
    pub longitude: f64,
    pub latitude: f64,
    pub distance: Option<f64>,
    pub start_time: String,
    pub end_time: String,
    pub event_type: String,
    pub max_participant_count: i32,
    pub description: String,
    pub deleted: bool,
    pub participant_id: Option<i64>,
    pub participant_username: Option<String>,
    pub participant_preferred_name: Option<String>,
    pub participant_profile_icon_url: Option<String>,
}

/// Upcoming (or not yet ended) event a user takes part in
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserScheduledEventDetail {
    pub event_id: i64,
    pub event_name: String,
    pub start_time: String,
    pub end_time: String,
    pub destination: String,
    pub event_type: String,
    #[serde(rename = "isDeleted")]
    pub deleted: bool,
    #[sqlx(skip)]
    pub sport_image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScheduledEventsResponse {
    pub user_events: Vec<UserScheduledEventDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventHistoryEntry {
    pub event_name: String,
    pub event_type: String,
    pub event_start_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_name: String,
    pub host_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub destination: String,
    pub long_lat: GeoPoint,
    pub event_type: String,
    pub max_participant_count: i32,
    pub description: String,
}

/// Host-only edit of the mutable event fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub event_id: i64,
    pub host_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
}
