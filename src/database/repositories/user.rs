//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::KickaboutError;

const USER_COLUMNS: &str = r#"
    u.id, u.username, up.preferred_name, up.profile_icon_url, u.created_at
    FROM users u
    LEFT JOIN user_profiles up ON up.user_id = u.id
"#;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with its profile row
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, KickaboutError> {
        let mut tx = self.pool.begin().await?;

        let (id, created_at): (i64, chrono::DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO users (username, created_at) VALUES ($1, $2) RETURNING id, created_at"
        )
        .bind(&request.username)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO user_profiles (user_id, preferred_name, profile_icon_url) VALUES ($1, $2, $3)"
        )
        .bind(id)
        .bind(&request.preferred_name)
        .bind(&request.profile_icon_url)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(User {
            id,
            username: request.username,
            preferred_name: request.preferred_name,
            profile_icon_url: request.profile_icon_url,
            created_at,
        })
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, KickaboutError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} WHERE u.id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, KickaboutError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} WHERE u.username = $1", USER_COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Resolve a user or fail with `UserNotFound`
    pub async fn get_by_id(&self, id: i64) -> Result<User, KickaboutError> {
        self.find_by_id(id)
            .await?
            .ok_or(KickaboutError::UserNotFound { user_id: id })
    }
}
