use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::reports::dtos::{ModerateReportDto, PendingReportDto, ReportResponseDto};
use crate::features::reports::handlers::ReportState;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List reports waiting for moderation
#[utoipa::path(
    get,
    path = "/api/admin/reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Pending reports, oldest first", body = ApiResponse<Vec<PendingReportDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("session_cookie" = [])),
    tag = "admin"
)]
pub async fn list_pending_reports(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<ReportState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<PendingReportDto>>>> {
    let (reports, total) = state.report_service.list_pending(&pagination).await?;
    let dtos: Vec<PendingReportDto> = reports.into_iter().map(|r| r.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Approve or reject a report
///
/// Approving may promote the author and re-arms the admin alert.
#[utoipa::path(
    patch,
    path = "/api/admin/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = ModerateReportDto,
    responses(
        (status = 200, description = "Report moderated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Status must be APPROVED or REJECTED"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report already moderated")
    ),
    security(("session_cookie" = [])),
    tag = "admin"
)]
pub async fn moderate_report(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ModerateReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    state.report_service.policy().check_target(dto.status)?;

    let outcome = state.report_service.moderate(id, &dto, admin.id).await?;
    let message = outcome
        .promoted_to
        .map(|role| format!("Author promoted to {}", role));

    Ok(Json(ApiResponse::success(
        Some(outcome.report.into()),
        message,
        None,
    )))
}
