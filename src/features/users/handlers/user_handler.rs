use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::guards::RequireAdmin;
use crate::features::users::dtos::{UnsubscribeQuery, UserResponseDto};
use crate::features::users::services::{UnsubscribeSigner, UserService};
use crate::shared::i18n::Locale;
use crate::shared::types::ApiResponse;

/// State for user handlers
#[derive(Clone)]
pub struct UsersState {
    pub user_service: Arc<UserService>,
    pub signer: UnsubscribeSigner,
    pub frontend_url: String,
}

/// Ban a user
///
/// Banned users keep their session but can no longer submit reports.
#[utoipa::path(
    post,
    path = "/api/admin/users/{user_id}/ban",
    tag = "admin",
    params(
        ("user_id" = Uuid, Path, description = "User to ban")
    ),
    responses(
        (status = 200, description = "User banned", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Administrators cannot be banned"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn ban_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<UsersState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>, AppError> {
    let user = state.user_service.ban(user_id).await?;
    tracing::info!("Admin {} banned user {}", admin.id, user.id);

    Ok(Json(ApiResponse::success(
        Some(user.into()),
        Some("User banned".to_string()),
        None,
    )))
}

/// Unsubscribe from status-change emails
///
/// Target of the link embedded in every status email. Redirects to the
/// confirmation page of the web client.
#[utoipa::path(
    get,
    path = "/api/unsubscribe",
    tag = "users",
    params(UnsubscribeQuery),
    responses(
        (status = 303, description = "Unsubscribed, redirect to the confirmation page"),
        (status = 400, description = "Missing user id or invalid token"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn unsubscribe(
    State(state): State<UsersState>,
    Query(query): Query<UnsubscribeQuery>,
) -> Result<Redirect, AppError> {
    let user_id = query
        .user_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;
    let user_id = Uuid::parse_str(user_id)
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;

    let token = query.token.as_deref().unwrap_or_default();
    if !state.signer.verify(user_id, token) {
        return Err(AppError::BadRequest(
            "Invalid unsubscribe link".to_string(),
        ));
    }

    state.user_service.unsubscribe(user_id).await?;

    let locale = Locale::parse_or_default(query.locale.as_deref());
    Ok(Redirect::to(&format!(
        "{}/{}/unsubscribe",
        state.frontend_url, locale
    )))
}
