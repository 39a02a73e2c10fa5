//! Hosting quota repository
//!
//! Counters live in one row per user. Every read-modify-write happens under
//! `SELECT ... FOR UPDATE` so concurrent event creations by the same host
//! serialize on that row.

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::config::HostingConfig;
use crate::models::hosting::{HostingConfigInfo, HostingCounters};
use crate::utils::errors::KickaboutError;
use crate::utils::logging::log_hosting_update;

#[derive(Clone, Debug)]
pub struct HostingRepository {
    pool: PgPool,
    config: HostingConfig,
}

impl HostingRepository {
    pub fn new(pool: PgPool, config: HostingConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &HostingConfig {
        &self.config
    }

    /// Read the quota, applying any elapsed refresh, and record a hosting when asked
    pub async fn get_or_update(&self, user_id: i64, did_just_host: bool) -> Result<HostingConfigInfo, KickaboutError> {
        let mut tx = self.pool.begin().await?;
        let info = self.get_or_update_in(&mut *tx, user_id, did_just_host).await?;
        tx.commit().await?;

        Ok(info)
    }

    /// Same as [`get_or_update`](Self::get_or_update) on a caller-owned transaction
    pub async fn get_or_update_in(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        did_just_host: bool,
    ) -> Result<HostingConfigInfo, KickaboutError> {
        sqlx::query("INSERT INTO user_hosting_config (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    KickaboutError::UserNotFound { user_id }
                }
                other => KickaboutError::Database(other),
            })?;

        let counters = sqlx::query_as::<_, HostingCounters>(
            "SELECT host_count, last_refresh_time FROM user_hosting_config WHERE user_id = $1 FOR UPDATE"
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        let now = Utc::now();
        let transition = counters.advance(&self.config, did_just_host, now);

        if transition.changed {
            sqlx::query(
                "UPDATE user_hosting_config SET host_count = $2, last_refresh_time = $3 WHERE user_id = $1"
            )
            .bind(user_id)
            .bind(transition.counters.host_count)
            .bind(transition.counters.last_refresh_time)
            .execute(&mut *conn)
            .await?;
        }

        let info = transition.counters.info(&self.config, now);
        log_hosting_update(
            user_id,
            info.host_count,
            transition.refreshed,
            if info.is_valid() { "VALID" } else { "INVALID" },
        );

        Ok(info)
    }
}
