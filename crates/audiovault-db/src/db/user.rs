use audiovault_core::models::{AccountType, User};
use audiovault_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::map_unique_violation;

const DUPLICATE_ACCOUNT: &str = "Username or email already registered";

/// Fields written when an account is created
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub account_type: AccountType,
}

/// Repository for the `users` table
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, user), fields(db.table = "users", db.operation = "insert", username = %user.username))]
    pub async fn create(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (username, password_hash, email, first_name, last_name, account_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, username, password_hash, email, first_name, last_name,
                      account_type, created_at, last_logged_in
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.account_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_ACCOUNT))
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %user_id))]
    pub async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            SELECT user_id, username, password_hash, email, first_name, last_name,
                   account_type, created_at, last_logged_in
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            SELECT user_id, username, password_hash, email, first_name, last_name,
                   account_type, created_at, last_logged_in
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<Postgres, User>(
            r#"
            SELECT user_id, username, password_hash, email, first_name, last_name,
                   account_type, created_at, last_logged_in
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Update login identity fields; `password_hash` is only written when present.
    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "update", db.record_id = %user_id))]
    pub async fn update_credentials(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        password_hash: Option<String>,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<Postgres, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = COALESCE($4, password_hash)
            WHERE user_id = $1
            RETURNING user_id, username, password_hash, email, first_name, last_name,
                      account_type, created_at, last_logged_in
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_ACCOUNT))
    }

    /// Admin update including names.
    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "update", db.record_id = %user_id))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: Option<String>,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<Postgres, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, first_name = $4, last_name = $5,
                password_hash = COALESCE($6, password_hash)
            WHERE user_id = $1
            RETURNING user_id, username, password_hash, email, first_name, last_name,
                      account_type, created_at, last_logged_in
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_ACCOUNT))
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %user_id))]
    pub async fn touch_last_login(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_logged_in = NOW() WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete an account; sessions and upload records cascade.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete", db.record_id = %user_id))]
    pub async fn delete(&self, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
