//! Event repository implementation
//!
//! Discovery, lookups and the participation writes. Capacity is enforced by
//! the store: `events.participant_count` only moves through a conditional
//! `UPDATE` whose affected-row count decides whether a join landed.

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use tracing::{debug, error};
use crate::discovery::{build_page, fold_rows, sql_distance, ValidatedFilter};
use crate::models::event::{
    CreateEventRequest, Event, EventDetail, EventDetailResponse, EventHistoryEntry, EventParticipantRow,
    UpdateEventRequest, UserScheduledEventDetail,
};
use crate::utils::errors::KickaboutError;
use crate::utils::logging::log_database_operation;

const EVENT_COLUMNS: &str = "id, event_name, host_id, destination, longitude, latitude, start_time, end_time, \
    event_type, max_participant_count, description, deleted";

/// Host, event and participant columns shared by the fan-out queries
const DETAIL_SELECT: &str = r#"
    SELECT
        event.id,
        event.event_name,
        event.host_id,
        u.username AS host_username,
        up.preferred_name AS host_preferred_name,
        up.profile_icon_url AS host_profile_icon_url,
        event.destination,
        event.longitude,
        event.latitude,
        event.distance,
        event.start_time,
        event.end_time,
        event.event_type,
        event.max_participant_count,
        event.description,
        event.deleted,
        ep.user_id AS participant_id,
        pu.username AS participant_username,
        pup.preferred_name AS participant_preferred_name,
        pup.profile_icon_url AS participant_profile_icon_url
    FROM event
    INNER JOIN users u ON u.id = event.host_id
    LEFT JOIN user_profiles up ON up.user_id = event.host_id
    LEFT JOIN event_participants ep ON ep.event_id = event.id
    LEFT JOIN users pu ON pu.id = ep.user_id
    LEFT JOIN user_profiles pup ON pup.user_id = pu.id
"#;

#[derive(Clone, Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an event with its host as first participant, on a caller-owned transaction
    pub async fn create_in(&self, conn: &mut PgConnection, request: &CreateEventRequest) -> Result<Event, KickaboutError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                event_name, host_id, destination, longitude, latitude, start_time, end_time,
                event_type, max_participant_count, participant_count, description, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1, $10, $11)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(&request.event_name)
        .bind(request.host_id)
        .bind(&request.destination)
        .bind(request.long_lat.longitude)
        .bind(request.long_lat.latitude)
        .bind(&request.start_time)
        .bind(&request.end_time)
        .bind(&request.event_type)
        .bind(request.max_participant_count)
        .bind(&request.description)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_participation_error(e, 0, request.host_id))?;

        sqlx::query("INSERT INTO event_participants (event_id, user_id, joined_at) VALUES ($1, $2, $3)")
            .bind(event.id)
            .bind(request.host_id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        Ok(event)
    }

    /// Find event by ID, cancelled events included
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, KickaboutError> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Next page of upcoming events nearest to the filter's location.
    ///
    /// One ranked query: the CTE picks at most `page_size` events past the
    /// cursor boundary, the outer select fans them out per participant.
    pub async fn get_events(&self, filter: &ValidatedFilter, requesting_user_id: i64) -> Result<EventDetailResponse, KickaboutError> {
        let distance = sql_distance("e", 1, 2);
        let query = format!(
            r#"
            WITH event AS (
                SELECT e.*, {distance} AS distance
                FROM events e
                WHERE e.start_time::timestamptz > $3
                  AND e.event_type = ANY($4)
                  AND e.deleted IS FALSE
                  AND ($5::float8 IS NULL OR ({distance} >= $5::float8 AND NOT (e.id = ANY($6))))
                ORDER BY distance ASC
                LIMIT $7
            )
            {select}
            ORDER BY event.distance ASC, ep.joined_at ASC
            "#,
            distance = distance,
            select = DETAIL_SELECT,
        );

        let started = std::time::Instant::now();
        let rows = sqlx::query_as::<_, EventParticipantRow>(&query)
            .bind(filter.from_location.longitude)
            .bind(filter.from_location.latitude)
            .bind(Utc::now())
            .bind(&filter.event_types)
            .bind(filter.cursor.last_distance)
            .bind(&filter.cursor.visited_event_index)
            .bind(filter.page_size)
            .fetch_all(&self.pool)
            .await;
        log_database_operation("discover", "events", started.elapsed().as_millis() as u64, rows.is_ok());

        let rows = rows.map_err(|e| {
            error!(error = %e, "Discovery query failed");
            KickaboutError::Database(e)
        })?;
        debug!(rows = rows.len(), page_size = filter.page_size, "Discovery rows fetched");

        let events = fold_rows(rows, requesting_user_id);
        build_page(&filter.cursor, events, filter.page_size)
    }

    /// Full detail of one event as seen by `requesting_user_id`
    pub async fn get_event_by_id(&self, event_id: i64, requesting_user_id: i64) -> Result<EventDetail, KickaboutError> {
        let query = format!(
            r#"
            WITH event AS (
                SELECT e.*, NULL::float8 AS distance FROM events e WHERE e.id = $1
            )
            {}
            ORDER BY ep.joined_at ASC
            "#,
            DETAIL_SELECT
        );

        let rows = sqlx::query_as::<_, EventParticipantRow>(&query)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        fold_rows(rows, requesting_user_id)
            .into_iter()
            .next()
            .ok_or(KickaboutError::EventNotFound { event_id })
    }

    /// Join an event without ever exceeding its capacity.
    ///
    /// The participation row and the counter bump share a transaction; the
    /// conditional counter `UPDATE` is the only capacity check, so a lost race
    /// surfaces as `StaleInfo` rather than a momentarily over-full event.
    pub async fn join_event(&self, event_id: i64, user_id: i64) -> Result<(), KickaboutError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO event_participants (event_id, user_id, joined_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#
        )
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_participation_error(e, event_id, user_id))?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Err(KickaboutError::AlreadyJoined { event_id, user_id });
        }

        let claimed = sqlx::query(
            r#"
            UPDATE events
            SET participant_count = participant_count + 1
            WHERE id = $1 AND deleted IS FALSE AND participant_count < max_participant_count
            "#
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            let deleted: Option<(bool,)> = sqlx::query_as("SELECT deleted FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return Err(match deleted {
                None | Some((true,)) => KickaboutError::EventNotFound { event_id },
                Some((false,)) => KickaboutError::StaleInfo { event_id },
            });
        }

        tx.commit().await?;
        Ok(())
    }

    /// Leave an event; returns whether a participation row was removed
    pub async fn quit_event(&self, event_id: i64, user_id: i64) -> Result<bool, KickaboutError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM event_participants WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed > 0 {
            sqlx::query("UPDATE events SET participant_count = participant_count - 1 WHERE id = $1")
                .bind(event_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(removed > 0)
    }

    /// Host-only edit of start time, end time and description
    pub async fn update_event(&self, request: &UpdateEventRequest) -> Result<Event, KickaboutError> {
        let updated = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET start_time = $1, end_time = $2, description = $3
            WHERE id = $4 AND host_id = $5 AND deleted IS FALSE
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(&request.start_time)
        .bind(&request.end_time)
        .bind(&request.description)
        .bind(request.event_id)
        .bind(request.host_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(event) => Ok(event),
            None => Err(self.explain_missed_host_write(request.event_id, request.host_id).await),
        }
    }

    /// Host-only soft delete. Returns `false` when the event was already cancelled.
    pub async fn cancel_event(&self, event_id: i64, host_id: i64) -> Result<bool, KickaboutError> {
        let cancelled = sqlx::query("UPDATE events SET deleted = TRUE WHERE id = $1 AND host_id = $2 AND deleted IS FALSE")
            .bind(event_id)
            .bind(host_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if cancelled > 0 {
            return Ok(true);
        }

        match self.find_by_id(event_id).await? {
            Some(event) if event.host_id == host_id && event.deleted => Ok(false),
            _ => Err(self.explain_missed_host_write(event_id, host_id).await),
        }
    }

    /// Events the user takes part in that have not ended yet, soonest first
    pub async fn get_user_events(&self, user_id: i64) -> Result<Vec<UserScheduledEventDetail>, KickaboutError> {
        let events = sqlx::query_as::<_, UserScheduledEventDetail>(
            r#"
            SELECT
                e.id AS event_id,
                e.event_name,
                e.start_time,
                e.end_time,
                e.destination,
                e.event_type,
                e.deleted
            FROM event_participants ep
            INNER JOIN events e ON ep.event_id = e.id
            WHERE e.end_time::timestamptz > $1 AND ep.user_id = $2
            ORDER BY e.start_time::timestamptz ASC
            "#
        )
        .bind(Utc::now())
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Past events the user joined, newest first; `page_number` starts at 1
    pub async fn get_history(&self, user_id: i64, page_number: i64, page_size: i64) -> Result<Vec<EventHistoryEntry>, KickaboutError> {
        if page_number < 1 || page_size < 1 {
            return Err(KickaboutError::Validation(
                "pageNumber and pageSize must be at least 1".to_string()
            ));
        }
        let offset = (page_number - 1).checked_mul(page_size).ok_or_else(|| {
            KickaboutError::Validation("pageNumber is too large".to_string())
        })?;

        let history = sqlx::query_as::<_, EventHistoryEntry>(
            r#"
            SELECT e.event_name, e.event_type, e.start_time AS event_start_time
            FROM events e
            INNER JOIN event_participants ep ON ep.event_id = e.id
            WHERE e.end_time::timestamptz < $1 AND ep.user_id = $2 AND e.deleted IS FALSE
            ORDER BY e.start_time::timestamptz DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(Utc::now())
        .bind(user_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    /// Number of finished, non-cancelled events the user took part in
    pub async fn get_user_joined_event_count(&self, user_id: i64) -> Result<i64, KickaboutError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM event_participants ep
            INNER JOIN events e ON ep.event_id = e.id
            WHERE ep.user_id = $1 AND e.end_time::timestamptz < $2 AND e.deleted IS FALSE
            "#
        )
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Number of non-cancelled events both users joined
    pub async fn get_mutual_joined_event_count(&self, user_id: i64, other_user_id: i64) -> Result<i64, KickaboutError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM event_participants ep
            INNER JOIN event_participants ep2 ON ep.event_id = ep2.event_id
            INNER JOIN events e ON ep.event_id = e.id
            WHERE ep.user_id = $1 AND ep2.user_id = $2 AND e.deleted IS FALSE
            "#
        )
        .bind(user_id)
        .bind(other_user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Why a host-scoped write touched no row
    async fn explain_missed_host_write(&self, event_id: i64, host_id: i64) -> KickaboutError {
        match self.find_by_id(event_id).await {
            Ok(None) => KickaboutError::EventNotFound { event_id },
            Ok(Some(event)) if event.host_id != host_id => KickaboutError::PermissionDenied(
                format!("User {} is not the host of event {}", host_id, event_id)
            ),
            Ok(Some(_)) => KickaboutError::EventNotFound { event_id },
            Err(e) => e,
        }
    }
}

/// Map foreign-key failures on participation writes to the missing entity
fn map_participation_error(e: sqlx::Error, event_id: i64, user_id: i64) -> KickaboutError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_foreign_key_violation() {
            let constraint = db.constraint().unwrap_or_default();
            return if constraint.contains("event_id") {
                KickaboutError::EventNotFound { event_id }
            } else {
                KickaboutError::UserNotFound { user_id }
            };
        }
    }
    KickaboutError::Database(e)
}
