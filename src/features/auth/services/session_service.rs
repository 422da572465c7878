use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::tokens::{generate_token, hash_token};
use crate::features::users::models::User;
use crate::shared::constants::SESSION_TTL_DAYS;

/// Session freshly created at sign-in; `token` goes into the cookie
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Server-side sessions keyed by the hash of the cookie token
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a session for a user, dropping their expired ones
    pub async fn create(&self, user_id: Uuid) -> Result<NewSession> {
        let token = generate_token();
        let expires = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        let purged = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires <= NOW()")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge expired sessions: {:?}", e);
                AppError::Database(e)
            })?
            .rows_affected();
        if purged > 0 {
            tracing::debug!("Purged {} expired session(s) of user {}", purged, user_id);
        }

        sqlx::query(
            r#"
            INSERT INTO sessions (session_token_hash, user_id, expires)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(expires)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create session: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Created session for user {}", user_id);
        Ok(NewSession { token, expires })
    }

    /// Resolve a cookie token to its user, ignoring expired sessions
    pub async fn resolve(&self, token: &str) -> Result<Option<AuthenticatedUser>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                u.id, u.email, u.name, u.image, u.email_verified, u.role, u.status,
                u.notify_on_status_change, u.created_at, u.updated_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.session_token_hash = $1
              AND s.expires > NOW()
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve session: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(user.map(AuthenticatedUser::from))
    }

    /// Delete the session behind a cookie token
    pub async fn delete(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE session_token_hash = $1")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete session: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
