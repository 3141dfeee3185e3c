use chrono::{DateTime, Utc};

/// A row in the `users` table.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never the plain password.
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A row in the `auth_tokens` table. One per user.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}
