//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub preferred_name: Option<String>,
    pub profile_icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Preferred name when set, username otherwise
    pub fn display_name(&self) -> &str {
        match self.preferred_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

/// Public profile summary shown for hosts and participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: i64,
    pub username: String,
    #[serde(rename = "userPreferredName")]
    pub preferred_name: Option<String>,
    pub profile_icon_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            preferred_name: user.preferred_name.clone(),
            profile_icon_url: user.profile_icon_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub preferred_name: Option<String>,
    pub profile_icon_url: Option<String>,
}
