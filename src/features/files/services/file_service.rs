use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::FileResponseDto;
use crate::features::files::models::File;
use crate::modules::storage::MinIOClient;
use crate::shared::validation::sanitize_filename;

/// Service for photo uploads
pub struct FileService {
    pool: PgPool,
    minio_client: Arc<MinIOClient>,
}

impl FileService {
    pub fn new(pool: PgPool, minio_client: Arc<MinIOClient>) -> Self {
        Self { pool, minio_client }
    }

    /// Upload a photo to storage and save its metadata
    pub async fn upload_file(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        user_id: Uuid,
    ) -> Result<FileResponseDto> {
        let file_size = data.len() as i64;
        let safe_name = sanitize_filename(original_filename);
        let file_key = self
            .minio_client
            .generate_key(&user_id.to_string(), &safe_name);

        self.minio_client
            .upload(&file_key, data, content_type)
            .await?;

        debug!("File uploaded to MinIO: {}", file_key);

        let url = self.minio_client.get_file_url(&file_key);

        let inserted = sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (file_key, original_filename, content_type, file_size, url, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, file_key, original_filename, content_type, file_size, url, uploaded_by, created_at
            "#,
        )
        .bind(&file_key)
        .bind(original_filename)
        .bind(content_type)
        .bind(file_size)
        .bind(&url)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;

        let file = match inserted {
            Ok(file) => file,
            Err(e) => {
                // Do not leave an orphan object behind
                if let Err(cleanup) = self.minio_client.delete(&file_key).await {
                    warn!("Failed to remove orphan upload {}: {}", file_key, cleanup);
                }
                tracing::error!("Failed to save file metadata: {:?}", e);
                return Err(AppError::Database(e));
            }
        };

        info!(
            "File metadata saved: id={}, key={}, size={}",
            file.id, file.file_key, file.file_size
        );

        Ok(file.into())
    }
}
