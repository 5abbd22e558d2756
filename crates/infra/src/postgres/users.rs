use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use taskflow_auth::{User, UserStore};
use taskflow_core::DomainResult;

use super::rows::UserRow;
use crate::error::map_sqlx_error;

/// Credential store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip_all, err)]
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        Ok(row.map(User::from))
    }

    /// Relies on `users_email_key` for uniqueness; a duplicate surfaces as
    /// a conflict.
    #[instrument(skip_all, fields(user_id = %user.id), err)]
    async fn insert(&self, user: &User) -> DomainResult<()> {
        sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)")
            .bind(user.id.as_uuid())
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }
}
