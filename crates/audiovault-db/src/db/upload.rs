use audiovault_core::models::{NewUploadRecord, StoredLocation, UploadRecord, UploadStatus};
use audiovault_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::record_store::{plan_transition, UploadRecordStore};
use super::transaction::with_transaction;

/// Repository for the `audio_files` table
#[derive(Clone)]
pub struct UploadRecordRepository {
    pool: PgPool,
}

impl UploadRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a record only if it belongs to `user_id`
    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select", db.record_id = %file_id))]
    pub async fn get_for_user(
        &self,
        user_id: Uuid,
        file_id: Uuid,
    ) -> Result<Option<UploadRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, UploadRecord>(
            r#"
            SELECT file_id, user_id, description, category, file_path, storage_key,
                   upload_timestamp, processed_data, ai_processing_types, checksum, upload_status
            FROM audio_files
            WHERE file_id = $1 AND user_id = $2
            "#,
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// All records of a user, newest first
    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select"))]
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UploadRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, UploadRecord>(
            r#"
            SELECT file_id, user_id, description, category, file_path, storage_key,
                   upload_timestamp, processed_data, ai_processing_types, checksum, upload_status
            FROM audio_files
            WHERE user_id = $1
            ORDER BY upload_timestamp DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Delete a record owned by `user_id`. Returns false when nothing matched.
    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "delete", db.record_id = %file_id))]
    pub async fn delete_for_user(&self, user_id: Uuid, file_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM audio_files WHERE file_id = $1 AND user_id = $2")
            .bind(file_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records still `processing` that were created before `older_than`
    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select"))]
    pub async fn find_stale_processing(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UploadRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, UploadRecord>(
            r#"
            SELECT file_id, user_id, description, category, file_path, storage_key,
                   upload_timestamp, processed_data, ai_processing_types, checksum, upload_status
            FROM audio_files
            WHERE upload_status = 'processing' AND upload_timestamp < $1
            ORDER BY upload_timestamp ASC
            LIMIT $2
            "#,
        )
        .bind(older_than)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[async_trait::async_trait]
impl UploadRecordStore for UploadRecordRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "audio_files", db.operation = "insert", user_id = %record.user_id))]
    async fn insert(&self, record: NewUploadRecord) -> Result<UploadRecord, AppError> {
        let created = sqlx::query_as::<Postgres, UploadRecord>(
            r#"
            INSERT INTO audio_files (file_id, user_id, description, category, file_path, checksum, upload_status)
            VALUES ($1, $2, $3, $4, '', $5, 'processing')
            RETURNING file_id, user_id, description, category, file_path, storage_key,
                      upload_timestamp, processed_data, ai_processing_types, checksum, upload_status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(&record.description)
        .bind(record.category)
        .bind(&record.checksum)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select"))]
    async fn find_completed_by_user_and_digest(
        &self,
        user_id: Uuid,
        digest: &str,
    ) -> Result<Option<UploadRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, UploadRecord>(
            r#"
            SELECT file_id, user_id, description, category, file_path, storage_key,
                   upload_timestamp, processed_data, ai_processing_types, checksum, upload_status
            FROM audio_files
            WHERE user_id = $1 AND checksum = $2 AND upload_status = 'completed'
            ORDER BY upload_timestamp ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select"))]
    async fn find_completed_by_user_and_description(
        &self,
        user_id: Uuid,
        description: &str,
    ) -> Result<Option<UploadRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, UploadRecord>(
            r#"
            SELECT file_id, user_id, description, category, file_path, storage_key,
                   upload_timestamp, processed_data, ai_processing_types, checksum, upload_status
            FROM audio_files
            WHERE user_id = $1 AND description = $2 AND upload_status = 'completed'
            ORDER BY upload_timestamp ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Guarded transition: the row is locked, its current status checked, then updated
    /// in the same transaction.
    #[tracing::instrument(skip(self, location), fields(db.table = "audio_files", db.operation = "update", db.record_id = %file_id))]
    async fn update_status_and_location(
        &self,
        file_id: Uuid,
        status: UploadStatus,
        location: Option<StoredLocation>,
    ) -> Result<UploadRecord, AppError> {
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let current = sqlx::query_scalar::<Postgres, UploadStatus>(
                    "SELECT upload_status FROM audio_files WHERE file_id = $1 FOR UPDATE",
                )
                .bind(file_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Upload record not found".to_string()))?;

                let (file_path, storage_key) = plan_transition(current, status, location)?;

                let updated = sqlx::query_as::<Postgres, UploadRecord>(
                    r#"
                    UPDATE audio_files
                    SET upload_status = $2, file_path = $3, storage_key = $4
                    WHERE file_id = $1
                    RETURNING file_id, user_id, description, category, file_path, storage_key,
                              upload_timestamp, processed_data, ai_processing_types, checksum, upload_status
                    "#,
                )
                .bind(file_id)
                .bind(status)
                .bind(file_path)
                .bind(storage_key)
                .fetch_one(&mut **tx)
                .await?;

                Ok(updated)
            })
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "audio_files", db.operation = "select", db.record_id = %file_id))]
    async fn get(&self, file_id: Uuid) -> Result<Option<UploadRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, UploadRecord>(
            r#"
            SELECT file_id, user_id, description, category, file_path, storage_key,
                   upload_timestamp, processed_data, ai_processing_types, checksum, upload_status
            FROM audio_files
            WHERE file_id = $1
            "#,
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
