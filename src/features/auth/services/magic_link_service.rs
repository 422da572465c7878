use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::tokens::{generate_token, hash_token};
use crate::modules::mail::{render_email, EmailTemplate, Mailer, OutgoingEmail};
use crate::shared::constants::MAGIC_LINK_TTL_HOURS;
use crate::shared::i18n::Locale;

#[derive(Serialize)]
struct MagicLinkContext<'a> {
    url: &'a str,
}

/// Passwordless sign-in by emailed single-use link
pub struct MagicLinkService {
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
    public_url: String,
}

impl MagicLinkService {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>, public_url: String) -> Self {
        Self {
            pool,
            mailer,
            public_url,
        }
    }

    /// Store a fresh token for `email` and mail the sign-in link.
    /// Expired tokens of the same address are dropped first.
    pub async fn request(&self, email: &str, locale: Locale) -> Result<()> {
        let email = email.trim().to_lowercase();
        let token = generate_token();
        let expires = Utc::now() + Duration::hours(MAGIC_LINK_TTL_HOURS);

        sqlx::query("DELETE FROM verification_tokens WHERE identifier = $1 AND expires <= NOW()")
            .bind(&email)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge expired verification tokens: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query(
            r#"
            INSERT INTO verification_tokens (identifier, token_hash, expires)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&email)
        .bind(hash_token(&token))
        .bind(expires)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store verification token: {:?}", e);
            AppError::Database(e)
        })?;

        let url = callback_url(&self.public_url, &email, &token, locale);
        let rendered = render_email(EmailTemplate::MagicLink, locale, &MagicLinkContext { url: &url })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if let Err(e) = self
            .mailer
            .send(OutgoingEmail {
                to: email.clone(),
                subject: rendered.subject,
                html: rendered.html,
            })
            .await
        {
            tracing::warn!("Failed to send sign-in link to {}: {}", email, e);
        }

        Ok(())
    }

    /// Consume a token. Tokens are deleted on first use, expired or not.
    pub async fn consume(&self, email: &str, token: &str) -> Result<()> {
        let email = email.trim().to_lowercase();

        let expires = sqlx::query_scalar::<_, chrono::DateTime<Utc>>(
            r#"
            DELETE FROM verification_tokens
            WHERE identifier = $1 AND token_hash = $2
            RETURNING expires
            "#,
        )
        .bind(&email)
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to consume verification token: {:?}", e);
            AppError::Database(e)
        })?;

        match expires {
            Some(expires) if expires > Utc::now() => Ok(()),
            _ => Err(AppError::BadRequest(
                "Invalid or expired sign-in link".to_string(),
            )),
        }
    }
}

fn callback_url(public_url: &str, email: &str, token: &str, locale: Locale) -> String {
    format!(
        "{}/api/auth/callback/email?token={}&email={}&locale={}",
        public_url,
        token,
        urlencoding::encode(email),
        locale
    )
}
