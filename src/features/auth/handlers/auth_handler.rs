use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::auth::cookies::{
    oauth_state_cookie, removal_cookie, session_cookie, session_token_from_headers,
};
use crate::features::auth::dtos::{
    EmailCallbackQuery, EmailSignInDto, EmailSignInResponseDto, GoogleCallbackQuery,
    GoogleSignInQuery,
};
use crate::features::auth::model::{AuthenticatedUser, MaybeUser};
use crate::features::auth::services::{AuthService, OAuthState};
use crate::shared::constants::{OAUTH_STATE_COOKIE_NAME, SESSION_COOKIE_NAME};
use crate::shared::i18n::Locale;
use crate::shared::types::ApiResponse;

/// Send a magic sign-in link
///
/// Answers 200 whether or not the address belongs to an existing user.
#[utoipa::path(
    post,
    path = "/api/auth/signin/email",
    tag = "auth",
    request_body = EmailSignInDto,
    responses(
        (status = 200, description = "Sign-in link sent", body = ApiResponse<EmailSignInResponseDto>),
        (status = 400, description = "Invalid email address"),
    )
)]
pub async fn sign_in_with_email(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<EmailSignInDto>,
) -> Result<Json<ApiResponse<EmailSignInResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service
        .request_magic_link(&dto.email, dto.locale.unwrap_or_default())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(EmailSignInResponseDto { email: dto.email }),
        Some("Check your inbox for a sign-in link".to_string()),
        None,
    )))
}

/// Complete an email sign-in
#[utoipa::path(
    get,
    path = "/api/auth/callback/email",
    tag = "auth",
    params(EmailCallbackQuery),
    responses(
        (status = 303, description = "Session cookie set, redirect to the web client"),
        (status = 400, description = "Invalid or expired link"),
    )
)]
pub async fn email_callback(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    Query(query): Query<EmailCallbackQuery>,
) -> Result<(CookieJar, Redirect), AppError> {
    let session = service
        .complete_email_sign_in(&query.email, &query.token)
        .await?;
    let locale = Locale::parse_or_default(query.locale.as_deref());

    let jar = jar.add(session_cookie(session.token, service.secure_cookies()));
    Ok((jar, Redirect::to(&service.frontend_redirect(locale))))
}

/// Start a Google sign-in
#[utoipa::path(
    get,
    path = "/api/auth/signin/google",
    tag = "auth",
    params(GoogleSignInQuery),
    responses(
        (status = 303, description = "Redirect to Google"),
        (status = 400, description = "Google sign-in is not configured"),
    )
)]
pub async fn sign_in_with_google(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    Query(query): Query<GoogleSignInQuery>,
) -> Result<(CookieJar, Redirect), AppError> {
    let state = OAuthState::new(Locale::parse_or_default(query.locale.as_deref()));
    let url = service.google_authorize_url(&state)?;

    let jar = jar.add(oauth_state_cookie(state.encode(), service.secure_cookies()));
    Ok((jar, Redirect::to(&url)))
}

/// Complete a Google sign-in
#[utoipa::path(
    get,
    path = "/api/auth/callback/google",
    tag = "auth",
    params(GoogleCallbackQuery),
    responses(
        (status = 303, description = "Session cookie set, redirect to the web client"),
        (status = 400, description = "Missing code or state mismatch"),
        (status = 502, description = "Google rejected the code exchange"),
    )
)]
pub async fn google_callback(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Some(error) = query.error {
        return Err(AppError::BadRequest(format!(
            "Google sign-in failed: {}",
            error
        )));
    }

    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;
    let returned_state = query.state.unwrap_or_default();
    let state = OAuthState::verify(
        jar.get(OAUTH_STATE_COOKIE_NAME).map(|c| c.value()),
        &returned_state,
    )
    .ok_or_else(|| AppError::BadRequest("Invalid OAuth state".to_string()))?;

    let session = service.complete_google_sign_in(&code).await?;

    let jar = jar
        .remove(removal_cookie(OAUTH_STATE_COOKIE_NAME))
        .add(session_cookie(session.token, service.secure_cookies()));
    Ok((jar, Redirect::to(&service.frontend_redirect(state.locale))))
}

/// Current session
///
/// `data` is null when the request carries no valid session.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "auth",
    responses(
        (status = 200, description = "Signed-in user or null", body = ApiResponse<AuthenticatedUser>),
    )
)]
pub async fn get_session(MaybeUser(user): MaybeUser) -> Json<ApiResponse<AuthenticatedUser>> {
    Json(ApiResponse::success(user, None, None))
}

/// Sign out
#[utoipa::path(
    post,
    path = "/api/auth/signout",
    tag = "auth",
    responses(
        (status = 200, description = "Session deleted and cookie cleared"),
    )
)]
pub async fn sign_out(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), AppError> {
    if let Some(token) = session_token_from_headers(&headers) {
        service.sign_out(&token).await?;
    }

    Ok((
        jar.remove(removal_cookie(SESSION_COOKIE_NAME)),
        Json(ApiResponse::success(None, Some("Signed out".to_string()), None)),
    ))
}
