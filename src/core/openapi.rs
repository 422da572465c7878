use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{
    dtos as users_dtos, handlers as users_handlers, models as users_models,
};
use crate::shared::constants::SESSION_COOKIE_NAME;
use crate::shared::i18n::Locale;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::sign_in_with_email,
        auth::handlers::email_callback,
        auth::handlers::sign_in_with_google,
        auth::handlers::google_callback,
        auth::handlers::get_session,
        auth::handlers::sign_out,
        // Reports
        reports_handlers::report_handler::create_report,
        reports_handlers::report_handler::list_reports,
        reports_handlers::report_handler::get_report,
        // Admin
        reports_handlers::admin_report_handler::list_pending_reports,
        reports_handlers::admin_report_handler::moderate_report,
        users_handlers::ban_user,
        // Users
        users_handlers::unsubscribe,
        // Files
        files_handlers::upload_file,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Locale,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::EmailSignInDto,
            auth::dtos::EmailSignInResponseDto,
            ApiResponse<auth::model::AuthenticatedUser>,
            ApiResponse<auth::dtos::EmailSignInResponseDto>,
            // Users
            users_models::UserRole,
            users_models::UserStatus,
            users_dtos::UserResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
            // Reports
            reports_models::ReportStatus,
            reports_models::IssueType,
            reports_models::Severity,
            reports_dtos::CreateReportDto,
            reports_dtos::ModerateReportDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::ReportAuthorDto,
            reports_dtos::PendingReportDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<Vec<reports_dtos::PendingReportDto>>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Sign-in by email link or Google, sessions"),
        (name = "reports", description = "Report submission and the public map"),
        (name = "admin", description = "Moderation (administrators only)"),
        (name = "users", description = "Email preferences"),
        (name = "files", description = "Photo upload"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Haux Alerte API",
        version = "0.1.0",
        description = "API documentation for Haux Alerte",
    )
)]
pub struct ApiDoc;

/// Session cookie and bearer token security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/reports",
            "/api/reports/{id}",
            "/api/admin/reports",
            "/api/admin/reports/{id}",
            "/api/admin/users/{user_id}/ban",
            "/api/unsubscribe",
            "/api/upload",
            "/api/auth/session",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }

    #[test]
    fn test_security_schemes_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("session_cookie"));
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
