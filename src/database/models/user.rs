use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_USERNAME_CHARS: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Usernames are 1..=150 characters of letters, digits and `@.+-_`.
    pub fn is_valid_username(name: &str) -> bool {
        let len = name.chars().count();
        (1..=MAX_USERNAME_CHARS).contains(&len)
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    }
}
