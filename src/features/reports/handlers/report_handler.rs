use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppJsonRejection};
use crate::features::auth::model::{AuthenticatedUser, MaybeUser};
use crate::features::reports::dtos::{CreateReportDto, ReportListQuery, ReportResponseDto};
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
}

/// Submit a report
///
/// VISITOR accounts are limited to 10 reports per 24 hours and their
/// description and photo are discarded.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report created, pending moderation", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account banned"),
        (status = 429, description = "Too many reports in the last 24 hours")
    ),
    security(("session_cookie" = [])),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    body: std::result::Result<AppJson<CreateReportDto>, AppJsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    // Banned users get 403 even for an invalid body
    state.report_service.policy().check_submitter(&user)?;

    let AppJson(dto) = body?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = state.report_service.submit(&user, dto.into()).await?;
    state.report_service.alert_new_report();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(report.into()), None, None)),
    ))
}

/// List reports on the map
///
/// Anonymous visitors see APPROVED reports; signed-in users also see their
/// own PENDING reports.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Visible reports", body = ApiResponse<Vec<ReportResponseDto>>)
    ),
    tag = "reports"
)]
pub async fn list_reports(
    viewer: MaybeUser,
    State(state): State<ReportState>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = state
        .report_service
        .list_visible(viewer.id(), &query)
        .await?;
    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get a report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found or not visible")
    ),
    tag = "reports"
)]
pub async fn get_report(
    viewer: MaybeUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_visible(id, viewer.id()).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}
