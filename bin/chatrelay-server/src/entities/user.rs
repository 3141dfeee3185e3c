use std::future::Future;

use chrono::Utc;

use super::{parse_timestamp, NewUser, SqliteStore, TokenRecord, UserRecord};

pub(super) type UserRow = (i64, String, String, String, bool, String, Option<String>);

pub(super) const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_active, date_joined, last_login";

pub trait UserStore: Send + Sync + 'static {
    /// Insert `user` together with its first auth token, atomically.
    fn create_user_with_token(
        &self,
        user: NewUser,
        token_key: &str,
    ) -> impl Future<Output = Result<(UserRecord, TokenRecord), sqlx::Error>> + Send;

    fn find_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>, sqlx::Error>> + Send;

    fn username_exists(&self, username: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    fn email_exists(&self, email: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Stamp `last_login` with the current time.
    fn touch_last_login(&self, user_id: i64) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

pub(super) fn user_from_row(row: UserRow) -> UserRecord {
    let (id, username, email, password_hash, is_active, date_joined, last_login) = row;
    UserRecord {
        id,
        username,
        email,
        password_hash,
        is_active,
        date_joined: parse_timestamp(&date_joined, "date_joined"),
        last_login: last_login.map(|raw| parse_timestamp(&raw, "last_login")),
    }
}

impl UserStore for SqliteStore {
    async fn create_user_with_token(
        &self,
        user: NewUser,
        token_key: &str,
    ) -> Result<(UserRecord, TokenRecord), sqlx::Error> {
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            "INSERT INTO users (username, email, password_hash, is_active, date_joined) \
             VALUES (?1, ?2, ?3, 1, ?4)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&now_str)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO auth_tokens (key, user_id, created) VALUES (?1, ?2, ?3)")
            .bind(token_key)
            .bind(id)
            .bind(&now_str)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let record = UserRecord {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            date_joined: now,
            last_login: None,
        };
        let token = TokenRecord {
            key: token_key.to_owned(),
            user_id: id,
            created: now,
        };
        Ok((record, token))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(user_from_row))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn touch_last_login(&self, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
            .bind(Utc::now().to_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::is_unique_violation;

    fn alice() -> NewUser {
        NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$2b$04$hash".into(),
        }
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let (user, token) = store.create_user_with_token(alice(), "k1").await.unwrap();
        assert_eq!(token.user_id, user.id);
        assert!(user.is_active);

        let found = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "alice@example.com");
        assert!(found.last_login.is_none());

        assert!(store.username_exists("alice").await.unwrap());
        assert!(!store.username_exists("bob").await.unwrap());
        assert!(store.email_exists("alice@example.com").await.unwrap());
        assert!(!store.email_exists("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_unique_violation() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.create_user_with_token(alice(), "k1").await.unwrap();
        let err = store.create_user_with_token(alice(), "k2").await.unwrap_err();
        assert!(is_unique_violation(&err));
        // The failed insert must not leave an orphan token behind.
        let (tokens,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM auth_tokens")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(tokens, 1);
    }

    #[tokio::test]
    async fn touch_last_login_sets_timestamp() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let (user, _) = store.create_user_with_token(alice(), "k1").await.unwrap();
        store.touch_last_login(user.id).await.unwrap();
        let found = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert!(found.last_login.is_some());
    }
}
