//! Event service integration tests
//!
//! Host edits, cancellation, schedules, history and the notifications they fan out.

mod helpers;

use std::sync::Arc;
use std::time::Duration as StdDuration;
use assert_matches::assert_matches;
use chrono::Duration;
use helpers::*;
use kickabout::config::Settings;
use kickabout::models::event::{EventStatus, UpdateEventRequest};
use kickabout::services::{PushSink, ServiceFactory, SportCatalog, SportDetail};
use kickabout::KickaboutError;
use serial_test::serial;

fn catalog() -> SportCatalog {
    SportCatalog::from_sports(vec![SportDetail {
        sport_index: 0,
        sport: "futsal".to_string(),
        image_url: "https://img.test/futsal.png".to_string(),
    }])
}

fn services(test_db: &TestDatabase, sink: Arc<RecordingPush>) -> ServiceFactory {
    let sink: Arc<dyn PushSink> = sink;
    ServiceFactory::with_parts(&Settings::default(), test_db.unrestricted_service(), sink, catalog())
}

fn kinds(sink: &RecordingPush) -> Vec<String> {
    sink.sent()
        .iter()
        .map(|(_, payload)| payload.data["kind"].clone())
        .collect()
}

#[tokio::test]
#[serial]
async fn test_join_and_quit_notify_participants() {
    let test_db = TestDatabase::new().await;
    let sink = Arc::new(RecordingPush::default());
    let services = services(&test_db, sink.clone());
    let db = test_db.unrestricted_service();

    let host = create_user(&db).await;
    let player = create_user(&db).await;
    let silent = create_user(&db).await;
    db.messaging.upsert_token(host.id, "host-device").await.unwrap();
    db.messaging.upsert_token(player.id, "player-device").await.unwrap();

    let event = upcoming_event(&db, host.id, "futsal", ORIGIN, 4).await;
    services.event_service.join_event(event.id, player.id).await.unwrap();
    services.event_service.join_event(event.id, silent.id).await.unwrap();
    services.event_service.quit_event(event.id, player.id).await.unwrap();
    services.event_service.quit_event(event.id, player.id).await.unwrap();

    assert!(services.notification_service.shutdown(StdDuration::from_secs(5)).await);

    let sent = sink.sent();
    assert_eq!(sent.len(), 3, "second quit must not notify");

    let mut kinds = kinds(&sink);
    kinds.sort();
    assert_eq!(kinds, vec!["participant_joined", "participant_joined", "participant_left"]);

    for (tokens, payload) in &sent {
        assert!(tokens.contains(&"host-device".to_string()));
        assert_eq!(payload.data["eventId"], event.id.to_string());
    }
}

#[tokio::test]
#[serial]
async fn test_push_failures_never_fail_the_join() {
    let test_db = TestDatabase::new().await;
    let sink = Arc::new(RecordingPush::failing());
    let services = services(&test_db, sink.clone());
    let db = test_db.unrestricted_service();

    let host = create_user(&db).await;
    let player = create_user(&db).await;
    db.messaging.upsert_token(host.id, "host-device").await.unwrap();

    let event = upcoming_event(&db, host.id, "futsal", ORIGIN, 4).await;
    services.event_service.join_event(event.id, player.id).await.unwrap();

    assert!(services.notification_service.shutdown(StdDuration::from_secs(5)).await);
    assert_eq!(sink.sent().len(), 1);
    assert_eq!(test_db.participant_count(event.id).await, (2, 2));
}

#[tokio::test]
#[serial]
async fn test_only_the_host_edits_and_cancels() {
    let test_db = TestDatabase::new().await;
    let sink = Arc::new(RecordingPush::default());
    let services = services(&test_db, sink.clone());
    let db = test_db.unrestricted_service();

    let host = create_user(&db).await;
    let player = create_user(&db).await;
    db.messaging.upsert_token(player.id, "player-device").await.unwrap();
    let event = upcoming_event(&db, host.id, "futsal", ORIGIN, 4).await;
    services.event_service.join_event(event.id, player.id).await.unwrap();

    let update = UpdateEventRequest {
        event_id: event.id,
        host_id: player.id,
        start_time: "2031-03-01T18:00:00Z".to_string(),
        end_time: "2031-03-01T20:00:00Z".to_string(),
        description: "Moved to the evening".to_string(),
    };
    assert_matches!(
        services.event_service.update_event(update.clone()).await,
        Err(KickaboutError::PermissionDenied(_))
    );

    let updated = services
        .event_service
        .update_event(UpdateEventRequest { host_id: host.id, ..update.clone() })
        .await
        .unwrap();
    assert_eq!(updated.start_time, "2031-03-01T18:00:00Z");
    assert_eq!(updated.description, "Moved to the evening");

    assert_matches!(
        services.event_service.update_event(UpdateEventRequest {
            host_id: host.id,
            end_time: "2031-03-01T17:00:00Z".to_string(),
            ..update.clone()
        }).await,
        Err(KickaboutError::Validation(_))
    );

    assert_matches!(
        services.event_service.cancel_event(event.id, player.id).await,
        Err(KickaboutError::PermissionDenied(_))
    );
    services.event_service.cancel_event(event.id, host.id).await.unwrap();
    services.event_service.cancel_event(event.id, host.id).await.unwrap();

    let detail = services.event_service.get_event_by_id(event.id, player.id).await.unwrap();
    assert_eq!(detail.status, EventStatus::Cancel);
    assert!(detail.is_joined);

    assert_matches!(
        services.event_service.update_event(UpdateEventRequest { host_id: host.id, ..update }).await,
        Err(KickaboutError::EventNotFound { .. })
    );

    assert!(services.notification_service.shutdown(StdDuration::from_secs(5)).await);
    let mut kinds = kinds(&sink);
    kinds.sort();
    assert_eq!(kinds, vec!["event_cancelled", "event_updated", "participant_joined"]);
}

#[tokio::test]
#[serial]
async fn test_schedule_history_and_counts() {
    let test_db = TestDatabase::new().await;
    let services = services(&test_db, Arc::new(RecordingPush::default()));
    let db = test_db.unrestricted_service();

    let host = create_user(&db).await;
    let player = create_user(&db).await;

    let upcoming = upcoming_event(&db, host.id, "futsal", ORIGIN, 6).await;
    let unknown_sport = upcoming_event(&db, host.id, "curling", ORIGIN, 6).await;
    let past = insert_event(&db, event_request(host.id, "futsal", ORIGIN, 6, -Duration::days(3))).await;
    let older = insert_event(&db, event_request(host.id, "tennis", ORIGIN, 6, -Duration::days(5))).await;

    for event in [&upcoming, &unknown_sport] {
        services.event_service.join_event(event.id, player.id).await.unwrap();
    }
    // Joining past events directly; the service never offers them
    for event in [&past, &older] {
        db.events.join_event(event.id, player.id).await.unwrap();
    }

    let schedule = services.event_service.get_user_events(player.id).await.unwrap();
    assert_eq!(schedule.user_events.len(), 2);
    let futsal = schedule.user_events.iter().find(|e| e.event_id == upcoming.id).unwrap();
    assert_eq!(futsal.sport_image_url, "https://img.test/futsal.png");
    let curling = schedule.user_events.iter().find(|e| e.event_id == unknown_sport.id).unwrap();
    assert_eq!(curling.sport_image_url, "");

    let history = services.event_service.get_history(player.id, 1, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event_type, "futsal");
    assert_eq!(history[1].event_type, "tennis");

    let second_page = services.event_service.get_history(player.id, 2, 1).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].event_type, "tennis");

    assert_matches!(
        services.event_service.get_history(player.id, 0, 10).await,
        Err(KickaboutError::Validation(_))
    );
    assert_matches!(
        services.event_service.get_history(player.id, i64::MAX, 100).await,
        Err(KickaboutError::Validation(_))
    );

    assert_eq!(services.event_service.get_user_joined_event_count(player.id).await.unwrap(), 2);
    assert_eq!(services.event_service.get_mutual_joined_event_count(player.id, host.id).await.unwrap(), 4);

    services.event_service.cancel_event(upcoming.id, host.id).await.unwrap();
    assert_eq!(services.event_service.get_mutual_joined_event_count(player.id, host.id).await.unwrap(), 3);

    let schedule = services.event_service.get_user_events(player.id).await.unwrap();
    let cancelled = schedule.user_events.iter().find(|e| e.event_id == upcoming.id).unwrap();
    assert!(cancelled.deleted);
}

#[tokio::test]
#[serial]
async fn test_push_token_registration() {
    let test_db = TestDatabase::new().await;
    let services = services(&test_db, Arc::new(RecordingPush::default()));
    let db = test_db.unrestricted_service();

    let host = create_user(&db).await;
    let event = upcoming_event(&db, host.id, "futsal", ORIGIN, 4).await;

    assert_matches!(
        services.event_service.register_push_token(host.id, "   ").await,
        Err(KickaboutError::Validation(_))
    );

    services.event_service.register_push_token(host.id, "old-device").await.unwrap();
    services.event_service.register_push_token(host.id, "new-device").await.unwrap();
    assert_eq!(db.messaging.get_participant_tokens(event.id).await.unwrap(), vec!["new-device"]);

    services.event_service.unregister_push_token(host.id).await.unwrap();
    assert!(db.messaging.get_participant_tokens(event.id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_join_returns_before_payload_is_built() {
    let test_db = TestDatabase::new().await;
    let sink = Arc::new(RecordingPush::default());
    let services = services(&test_db, sink.clone());
    let db = test_db.unrestricted_service();

    let host = create_user(&db).await;
    let player = create_user(&db).await;
    db.messaging.upsert_token(host.id, "host-device").await.unwrap();
    let event = upcoming_event(&db, host.id, "futsal", ORIGIN, 4).await;

    // Single-threaded runtime: the dispatch cannot have run any lookup yet
    services.event_service.join_event(event.id, player.id).await.unwrap();
    assert_eq!(services.notification_service.in_flight(), 1);
    assert!(sink.sent().is_empty());

    assert!(services.notification_service.shutdown(StdDuration::from_secs(5)).await);
    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.body, format!("{} joined {}", player.display_name(), event.event_name));
}

#[tokio::test]
#[serial]
async fn test_notification_for_missing_event_is_skipped() {
    let test_db = TestDatabase::new().await;
    let sink = Arc::new(RecordingPush::default());
    let services = services(&test_db, sink.clone());

    services.notification_service.notify_participants(
        987_654,
        1,
        kickabout::models::notification::NotificationKind::EventUpdated,
    );

    assert!(services.notification_service.shutdown(StdDuration::from_secs(5)).await);
    assert!(sink.sent().is_empty());
}
