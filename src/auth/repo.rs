use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::claims::ACCESS_AUTH;
use super::repo_types::{AuthToken, NewUser, ProfileUpdate, User, UserRow};
use crate::db::StoreResult;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::DuplicateEmail` when the email is taken.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// User with this id that still holds `token` with access "auth".
    async fn find_by_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>>;
    async fn push_token(&self, id: Uuid, token: AuthToken) -> StoreResult<()>;
    /// Removes every entry equal to `token`; a missing token is not an error.
    async fn remove_token(&self, id: Uuid, token: &str) -> StoreResult<()>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> StoreResult<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn load_tokens(&self, id: Uuid) -> StoreResult<Vec<AuthToken>> {
        let tokens = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT access, token
              FROM user_tokens
             WHERE user_id = $1
             ORDER BY seq ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;
        Ok(tokens)
    }

    async fn hydrate(&self, row: Option<UserRow>) -> StoreResult<Option<User>> {
        match row {
            Some(row) => {
                let tokens = self.load_tokens(row.id).await?;
                Ok(Some(row.with_tokens(tokens)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(row.with_tokens(Vec::new()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash
              FROM users
             WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        self.hydrate(row).await
    }

    async fn find_by_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash
              FROM users u
             WHERE u.id = $1
               AND EXISTS (
                   SELECT 1 FROM user_tokens t
                    WHERE t.user_id = u.id AND t.token = $2 AND t.access = $3
               )
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(ACCESS_AUTH)
        .fetch_optional(&self.db)
        .await?;
        self.hydrate(row).await
    }

    async fn push_token(&self, id: Uuid, token: AuthToken) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, access, token)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(&token.access)
        .bind(&token.token)
        .execute(&self.db)
        .await
        .context("insert user token")?;
        Ok(())
    }

    async fn remove_token(&self, id: Uuid, token: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
            .bind(id)
            .bind(token)
            .execute(&self.db)
            .await
            .context("delete user token")?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET name = $2, email = $3, password_hash = $4
             WHERE id = $1
            RETURNING id, name, email, password_hash
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password_hash)
        .fetch_optional(&self.db)
        .await?;
        self.hydrate(row).await
    }
}
