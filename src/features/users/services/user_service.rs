use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::models::{UpsertUser, User, UserRole};

const USER_COLUMNS: &str = r#"
    id, email, name, image, email_verified, role, status,
    notify_on_status_change, created_at, updated_at
"#;

/// Service for user accounts
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Find the user linked to an OAuth account
    pub async fn find_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE id = (
                SELECT user_id FROM accounts
                WHERE provider = $1 AND provider_account_id = $2
            )
            "#,
            USER_COLUMNS
        ))
        .bind(provider)
        .bind(provider_account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find user by account: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Create the user on first sign-in, or fill in missing profile data.
    ///
    /// New users start as NEWCOMER. Existing role and status are never changed here.
    pub async fn upsert(&self, data: &UpsertUser) -> Result<User> {
        let email = data.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, image, email_verified)
            VALUES ($1, $2, $3, CASE WHEN $4 THEN NOW() END)
            ON CONFLICT (email) DO UPDATE
            SET name = COALESCE(users.name, EXCLUDED.name),
                image = COALESCE(users.image, EXCLUDED.image),
                email_verified = COALESCE(users.email_verified, EXCLUDED.email_verified),
                updated_at = NOW()
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&email)
        .bind(&data.name)
        .bind(&data.image)
        .bind(data.email_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert user: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::debug!("Upserted user {} ({})", user.id, user.role);
        Ok(user)
    }

    /// Link an OAuth account to a user (idempotent)
    pub async fn link_account(
        &self,
        user_id: Uuid,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (user_id, provider, provider_account_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (provider, provider_account_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(provider)
        .bind(provider_account_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to link account: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    /// Ban a user. Administrators cannot be banned.
    pub async fn ban(&self, user_id: Uuid) -> Result<User> {
        let target = self.get_by_id(user_id).await?;
        if target.role == UserRole::Admin {
            return Err(AppError::BadRequest(
                "Administrators cannot be banned".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET status = 'BANNED', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to ban user: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Banned user {}", user.id);
        Ok(user)
    }

    /// Stop status-change emails for a user
    pub async fn unsubscribe(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET notify_on_status_change = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to unsubscribe user: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        tracing::info!("User {} unsubscribed from status notifications", user_id);
        Ok(())
    }

    /// Email addresses of all active administrators
    pub async fn list_admin_emails(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT email FROM users
            WHERE role = 'ADMIN' AND status = 'ACTIVE'
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list admin emails: {:?}", e);
            AppError::Database(e)
        })
    }
}
