//! Role-based authorization guards.
//!
//! Role ladder (from highest to lowest): ADMIN, CITIZEN, VISITOR, NEWCOMER.
//! Only administrators moderate; every signed-in user may submit reports
//! unless banned.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for checking if user is an administrator.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Forbidden".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}
