//! Test data helpers
//!
//! Users get generated usernames; events are inserted straight through the
//! repository so tests can place them anywhere in time and space.

use chrono::{Duration, Utc};
use fake::faker::internet::en::Username;
use fake::faker::name::en::FirstName;
use fake::Fake;
use uuid::Uuid;
use kickabout::database::DatabaseService;
use kickabout::models::event::{CreateEventRequest, Event, GeoPoint};
use kickabout::models::user::{CreateUserRequest, User};

/// Reference point used by discovery tests
pub const ORIGIN: GeoPoint = GeoPoint { longitude: 103.8198, latitude: 1.3521 };

pub async fn create_user(db: &DatabaseService) -> User {
    let base: String = Username().fake();
    let request = CreateUserRequest {
        username: format!("{}_{}", base, &Uuid::new_v4().simple().to_string()[..8]),
        preferred_name: Some(FirstName().fake()),
        profile_icon_url: None,
    };

    db.users.create(request).await.expect("Failed to create test user")
}

pub async fn create_users(db: &DatabaseService, count: usize) -> Vec<User> {
    let mut users = Vec::with_capacity(count);
    for _ in 0..count {
        users.push(create_user(db).await);
    }
    users
}

/// Request for a two-hour event starting `starts_in` from now
pub fn event_request(host_id: i64, event_type: &str, at: GeoPoint, max: i32, starts_in: Duration) -> CreateEventRequest {
    let start = Utc::now() + starts_in;
    CreateEventRequest {
        event_name: format!("{} meetup", event_type),
        host_id,
        start_time: start.to_rfc3339(),
        end_time: (start + Duration::hours(2)).to_rfc3339(),
        destination: "Community court".to_string(),
        long_lat: at,
        event_type: event_type.to_string(),
        max_participant_count: max,
        description: "Bring water".to_string(),
    }
}

/// Insert an event (host auto-joined) without touching the hosting quota
pub async fn insert_event(db: &DatabaseService, request: CreateEventRequest) -> Event {
    let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
    db.events
        .create_in(&mut *conn, &request)
        .await
        .expect("Failed to insert test event")
}

/// Upcoming event of `event_type` at `at`, hosted by `host_id`
pub async fn upcoming_event(db: &DatabaseService, host_id: i64, event_type: &str, at: GeoPoint, max: i32) -> Event {
    insert_event(db, event_request(host_id, event_type, at, max, Duration::days(1))).await
}

/// A point `meters` north of `from`
pub fn north_of(from: GeoPoint, meters: f64) -> GeoPoint {
    let degrees = meters / kickabout::discovery::EARTH_RADIUS_METERS * 180.0 / std::f64::consts::PI;
    GeoPoint::new(from.longitude, from.latitude + degrees)
}
