//! Push token repository

use sqlx::PgPool;
use chrono::Utc;
use crate::utils::errors::KickaboutError;

#[derive(Clone, Debug)]
pub struct MessagingRepository {
    pool: PgPool,
}

impl MessagingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register or replace the user's push token
    pub async fn upsert_token(&self, user_id: i64, token: &str) -> Result<(), KickaboutError> {
        sqlx::query(
            r#"
            INSERT INTO push_tokens (user_id, token, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET token = EXCLUDED.token, updated_at = EXCLUDED.updated_at
            "#
        )
        .bind(user_id)
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Drop the user's push token
    pub async fn remove_token(&self, user_id: i64) -> Result<(), KickaboutError> {
        sqlx::query("DELETE FROM push_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Tokens of everyone currently participating in the event
    pub async fn get_participant_tokens(&self, event_id: i64) -> Result<Vec<String>, KickaboutError> {
        let tokens: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT pt.token
            FROM event_participants ep
            INNER JOIN push_tokens pt ON pt.user_id = ep.user_id
            WHERE ep.event_id = $1
            ORDER BY ep.joined_at ASC
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens.into_iter().map(|(token,)| token).collect())
    }
}
