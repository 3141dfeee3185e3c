use std::future::Future;

use chrono::Utc;

use super::user::{user_from_row, UserRow};
use super::{parse_timestamp, SqliteStore, TokenRecord, UserRecord};

pub trait TokenStore: Send + Sync + 'static {
    /// Return the user's token, inserting `candidate_key` if none exists yet.
    fn get_or_create_token(
        &self,
        user_id: i64,
        candidate_key: &str,
    ) -> impl Future<Output = Result<TokenRecord, sqlx::Error>> + Send;

    /// Resolve a token key to its owner.
    fn find_user_by_token(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>, sqlx::Error>> + Send;
}

impl TokenStore for SqliteStore {
    async fn get_or_create_token(
        &self,
        user_id: i64,
        candidate_key: &str,
    ) -> Result<TokenRecord, sqlx::Error> {
        sqlx::query(
            "INSERT INTO auth_tokens (key, user_id, created) VALUES (?1, ?2, ?3) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(candidate_key)
        .bind(user_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let (key, user_id, created): (String, i64, String) =
            sqlx::query_as("SELECT key, user_id, created FROM auth_tokens WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(TokenRecord {
            key,
            user_id,
            created: parse_timestamp(&created, "created"),
        })
    }

    async fn find_user_by_token(&self, key: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT u.id, u.username, u.email, u.password_hash, u.is_active, u.date_joined, u.last_login \
             FROM auth_tokens t JOIN users u ON u.id = t.user_id WHERE t.key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(user_from_row))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::{NewUser, UserStore};

    async fn store_with_user() -> (SqliteStore, UserRecord) {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let (user, _) = store
            .create_user_with_token(
                NewUser {
                    username: "bob".into(),
                    email: "bob@example.com".into(),
                    password_hash: "$2b$04$hash".into(),
                },
                "first-key",
            )
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn existing_token_is_reused() {
        let (store, user) = store_with_user().await;
        let token = store.get_or_create_token(user.id, "second-key").await.unwrap();
        assert_eq!(token.key, "first-key");
        assert_eq!(token.user_id, user.id);
    }

    #[tokio::test]
    async fn missing_token_is_created() {
        let (store, user) = store_with_user().await;
        sqlx::query("DELETE FROM auth_tokens")
            .execute(store.pool())
            .await
            .unwrap();
        let token = store.get_or_create_token(user.id, "fresh-key").await.unwrap();
        assert_eq!(token.key, "fresh-key");
    }

    #[tokio::test]
    async fn token_resolves_to_owner() {
        let (store, user) = store_with_user().await;
        let owner = store.find_user_by_token("first-key").await.unwrap().unwrap();
        assert_eq!(owner.id, user.id);
        assert_eq!(owner.username, "bob");
        assert!(store.find_user_by_token("nope").await.unwrap().is_none());
    }
}
