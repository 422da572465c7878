use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::clients::GoogleOAuthClient;
use crate::features::auth::services::{MagicLinkService, NewSession, SessionService};
use crate::features::auth::tokens::generate_token;
use crate::features::users::models::UpsertUser;
use crate::features::users::services::UserService;
use crate::shared::i18n::Locale;

pub const GOOGLE_PROVIDER: &str = "google";

/// Value of the OAuth `state` parameter: a random nonce plus the locale to
/// return to, mirrored in a short-lived cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub nonce: String,
    pub locale: Locale,
}

impl OAuthState {
    pub fn new(locale: Locale) -> Self {
        Self {
            nonce: generate_token(),
            locale,
        }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.nonce, self.locale)
    }

    /// Check the `state` echoed by the provider against the cookie value
    pub fn verify(cookie_value: Option<&str>, returned: &str) -> Option<Self> {
        let cookie_value = cookie_value?;
        if cookie_value.is_empty() || cookie_value != returned {
            return None;
        }
        let (nonce, locale) = returned.split_once(':')?;
        Some(Self {
            nonce: nonce.to_string(),
            locale: Locale::parse_or_default(Some(locale)),
        })
    }
}

/// Sign-in flows on top of users and sessions
pub struct AuthService {
    user_service: Arc<UserService>,
    session_service: Arc<SessionService>,
    magic_link_service: Arc<MagicLinkService>,
    google: Option<GoogleOAuthClient>,
    frontend_url: String,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(
        user_service: Arc<UserService>,
        session_service: Arc<SessionService>,
        magic_link_service: Arc<MagicLinkService>,
        google: Option<GoogleOAuthClient>,
        frontend_url: String,
        secure_cookies: bool,
    ) -> Self {
        Self {
            user_service,
            session_service,
            magic_link_service,
            google,
            frontend_url,
            secure_cookies,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Page of the web client to land on after sign-in
    pub fn frontend_redirect(&self, locale: Locale) -> String {
        format!("{}/{}", self.frontend_url, locale)
    }

    pub async fn request_magic_link(&self, email: &str, locale: Locale) -> Result<()> {
        self.magic_link_service.request(email, locale).await
    }

    pub async fn complete_email_sign_in(&self, email: &str, token: &str) -> Result<NewSession> {
        self.magic_link_service.consume(email, token).await?;

        let user = self
            .user_service
            .upsert(&UpsertUser {
                email: email.to_string(),
                email_verified: true,
                ..Default::default()
            })
            .await?;

        tracing::info!("User {} signed in by email link", user.id);
        self.session_service.create(user.id).await
    }

    fn google_client(&self) -> Result<&GoogleOAuthClient> {
        self.google
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Google sign-in is not configured".to_string()))
    }

    pub fn google_authorize_url(&self, state: &OAuthState) -> Result<String> {
        Ok(self.google_client()?.authorize_url(&state.encode()))
    }

    pub async fn complete_google_sign_in(&self, code: &str) -> Result<NewSession> {
        let google = self.google_client()?;

        let token = google
            .exchange_code(code)
            .await
            .map_err(|e| AppError::ExternalServiceError(e.to_string()))?;
        let profile = google
            .fetch_user_info(&token.access_token)
            .await
            .map_err(|e| AppError::ExternalServiceError(e.to_string()))?;

        let user = match self
            .user_service
            .find_by_account(GOOGLE_PROVIDER, &profile.sub)
            .await?
        {
            Some(user) => user,
            None => {
                // Accounts are matched by email, which must be proven by the provider
                if !profile.email_verified {
                    return Err(AppError::BadRequest(
                        "Google account email is not verified".to_string(),
                    ));
                }
                let user = self
                    .user_service
                    .upsert(&UpsertUser {
                        email: profile.email.clone(),
                        name: profile.name.clone(),
                        image: profile.picture.clone(),
                        email_verified: true,
                    })
                    .await?;
                self.user_service
                    .link_account(user.id, GOOGLE_PROVIDER, &profile.sub)
                    .await?;
                user
            }
        };

        tracing::info!("User {} signed in with Google", user.id);
        self.session_service.create(user.id).await
    }

    pub async fn sign_out(&self, token: &str) -> Result<()> {
        self.session_service.delete(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trips_through_cookie() {
        let state = OAuthState::new(Locale::En);
        let encoded = state.encode();
        assert_eq!(OAuthState::verify(Some(&encoded), &encoded), Some(state));
    }

    #[test]
    fn test_state_mismatch_is_rejected() {
        let state = OAuthState::new(Locale::Fr).encode();
        let other = OAuthState::new(Locale::Fr).encode();
        assert!(OAuthState::verify(Some(&state), &other).is_none());
        assert!(OAuthState::verify(None, &state).is_none());
        assert!(OAuthState::verify(Some(""), "").is_none());
    }
}
