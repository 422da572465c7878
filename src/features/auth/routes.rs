use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::auth::handlers::{
    email_callback, get_session, google_callback, sign_in_with_email, sign_in_with_google,
    sign_out,
};
use crate::features::auth::services::AuthService;

pub fn routes(auth_service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/signin/email", post(sign_in_with_email))
        .route("/api/auth/callback/email", get(email_callback))
        .route("/api/auth/signin/google", get(sign_in_with_google))
        .route("/api/auth/callback/google", get(google_callback))
        .route("/api/auth/session", get(get_session))
        .route("/api/auth/signout", post(sign_out))
        .with_state(auth_service)
}
