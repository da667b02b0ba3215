use audiovault_core::models::Session;
use audiovault_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for the `sessions` table. Tokens are looked up by their hash.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, token_hash), fields(db.table = "sessions", db.operation = "insert", user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, AppError> {
        let session = sqlx::query_as::<Postgres, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING session_id, user_id, token_hash, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Session for the token hash, if it exists and has not expired
    #[tracing::instrument(skip(self, token_hash), fields(db.table = "sessions", db.operation = "select"))]
    pub async fn find_active(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<Postgres, Session>(
            r#"
            SELECT session_id, user_id, token_hash, created_at, expires_at
            FROM sessions
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    #[tracing::instrument(skip(self, token_hash), fields(db.table = "sessions", db.operation = "delete"))]
    pub async fn delete_by_token_hash(&self, token_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every session of a user (single active session per login)
    #[tracing::instrument(skip(self), fields(db.table = "sessions", db.operation = "delete", user_id = %user_id))]
    pub async fn delete_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
