use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{
    IssueType, NewReport, PendingReport, Report, ReportStatus, Severity,
};
use crate::shared::constants::{MAX_DESCRIPTION_LENGTH, MAX_REJECTION_REASON_LENGTH};

/// Report a problem at a map location
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    #[schema(example = 44.4205)]
    pub latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    #[schema(example = -0.3311)]
    pub longitude: f64,
    pub issue_type: IssueType,
    pub severity: Severity,
    /// Ignored for VISITOR accounts
    #[validate(length(max = MAX_DESCRIPTION_LENGTH, message = "Description is too long"))]
    pub description: Option<String>,
    /// URL returned by `POST /api/upload`. Ignored for VISITOR accounts
    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,
}

impl From<CreateReportDto> for NewReport {
    fn from(dto: CreateReportDto) -> Self {
        Self {
            latitude: dto.latitude,
            longitude: dto.longitude,
            issue_type: dto.issue_type,
            severity: dto.severity,
            description: dto
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            photo_url: dto.photo_url.filter(|p| !p.is_empty()),
        }
    }
}

/// Optional filters of the public map
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct ReportListQuery {
    pub severity: Option<Severity>,
    pub issue_type: Option<IssueType>,
}

/// Approve or reject a pending report
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerateReportDto {
    /// APPROVED or REJECTED
    pub status: ReportStatus,
    /// Only kept when rejecting
    #[validate(length(max = MAX_REJECTION_REASON_LENGTH, message = "Rejection reason is too long"))]
    pub rejection_reason: Option<String>,
}

impl ModerateReportDto {
    /// Reason to store: trimmed, and only for rejections
    pub fn stored_reason(&self) -> Option<String> {
        if self.status != ReportStatus::Rejected {
            return None;
        }
        self.rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub author_id: Uuid,
    pub status: ReportStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub rejection_reason: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            author_id: r.author_id,
            status: r.status,
            latitude: r.latitude,
            longitude: r.longitude,
            issue_type: r.issue_type,
            severity: r.severity,
            description: r.description,
            photo_url: r.photo_url,
            rejection_reason: r.rejection_reason,
            moderated_at: r.moderated_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportAuthorDto {
    pub id: Uuid,
    pub email: String,
}

/// Entry of the moderation queue
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingReportDto {
    #[serde(flatten)]
    pub report: ReportResponseDto,
    pub author: ReportAuthorDto,
}

impl From<PendingReport> for PendingReportDto {
    fn from(p: PendingReport) -> Self {
        let author = ReportAuthorDto {
            id: p.report.author_id,
            email: p.author_email,
        };
        Self {
            report: p.report.into(),
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_dto(value: serde_json::Value) -> CreateReportDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_report_passes_validation() {
        let dto = create_dto(json!({
            "latitude": 44.42,
            "longitude": -0.33,
            "issueType": "POTHOLE",
            "severity": "HIGH",
            "description": "Nid de poule devant l'école",
            "photoUrl": "http://minio.local/uploads/public/u/a.jpg"
        }));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_coordinates_fail() {
        let dto = create_dto(json!({
            "latitude": 91.0,
            "longitude": -181.0,
            "issueType": "OTHER",
            "severity": "LOW"
        }));
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("latitude"));
        assert!(fields.contains_key("longitude"));
    }

    #[test]
    fn test_long_description_and_bad_url_fail() {
        let dto = create_dto(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "issueType": "OTHER",
            "severity": "LOW",
            "description": "x".repeat(1001),
            "photoUrl": "not a url"
        }));
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("description"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let new_report: NewReport = create_dto(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "issueType": "OTHER",
            "severity": "LOW",
            "description": "   "
        }))
        .into();
        assert!(new_report.description.is_none());
    }

    #[test]
    fn test_reason_only_kept_for_rejections() {
        let approve = ModerateReportDto {
            status: ReportStatus::Approved,
            rejection_reason: Some("ignored".to_string()),
        };
        assert_eq!(approve.stored_reason(), None);

        let reject = ModerateReportDto {
            status: ReportStatus::Rejected,
            rejection_reason: Some("  Doublon  ".to_string()),
        };
        assert_eq!(reject.stored_reason().as_deref(), Some("Doublon"));

        let reject_blank = ModerateReportDto {
            status: ReportStatus::Rejected,
            rejection_reason: Some(" ".to_string()),
        };
        assert_eq!(reject_blank.stored_reason(), None);
    }

    #[test]
    fn test_pending_dto_nests_author() {
        let value = serde_json::to_value(PendingReportDto {
            report: ReportResponseDto {
                id: Uuid::nil(),
                author_id: Uuid::nil(),
                status: ReportStatus::Pending,
                latitude: 1.0,
                longitude: 2.0,
                issue_type: IssueType::Pothole,
                severity: Severity::Low,
                description: None,
                photo_url: None,
                rejection_reason: None,
                moderated_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            author: ReportAuthorDto {
                id: Uuid::nil(),
                email: "a@example.test".to_string(),
            },
        })
        .unwrap();

        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["issueType"], "POTHOLE");
        assert_eq!(value["author"]["email"], "a@example.test");
    }
}
