use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
    Resolved,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "PENDING"),
            ReportStatus::Approved => write!(f, "APPROVED"),
            ReportStatus::Rejected => write!(f, "REJECTED"),
            ReportStatus::Resolved => write!(f, "RESOLVED"),
        }
    }
}

/// Kind of road or infrastructure problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "issue_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Pothole,
    DamagedSurface,
    ObstructionDebris,
    FloodingWaterIssue,
    DamagedSignage,
    Other,
}

/// Report severity enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_severity", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
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
    pub moderated_by: Option<Uuid>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Approved reports are public; authors also see their own pending ones
    pub fn is_visible_to(&self, viewer: Option<Uuid>) -> bool {
        match self.status {
            ReportStatus::Approved => true,
            ReportStatus::Pending => viewer == Some(self.author_id),
            ReportStatus::Rejected | ReportStatus::Resolved => false,
        }
    }
}

/// Data for creating a new report
#[derive(Debug, Clone)]
pub struct NewReport {
    pub latitude: f64,
    pub longitude: f64,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

/// Pending report joined with its author, for the moderation queue
#[derive(Debug, Clone, FromRow)]
pub struct PendingReport {
    #[sqlx(flatten)]
    pub report: Report,
    pub author_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: ReportStatus, author_id: Uuid) -> Report {
        Report {
            id: Uuid::new_v4(),
            author_id,
            status,
            latitude: 44.42,
            longitude: -0.33,
            issue_type: IssueType::FloodingWaterIssue,
            severity: Severity::Medium,
            description: None,
            photo_url: None,
            rejection_reason: None,
            moderated_by: None,
            moderated_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_approved_reports_are_public() {
        let author = Uuid::new_v4();
        let r = report(ReportStatus::Approved, author);
        assert!(r.is_visible_to(None));
        assert!(r.is_visible_to(Some(Uuid::new_v4())));
        assert!(r.is_visible_to(Some(author)));
    }

    #[test]
    fn test_pending_reports_only_visible_to_author() {
        let author = Uuid::new_v4();
        let r = report(ReportStatus::Pending, author);
        assert!(!r.is_visible_to(None));
        assert!(!r.is_visible_to(Some(Uuid::new_v4())));
        assert!(r.is_visible_to(Some(author)));
    }

    #[test]
    fn test_rejected_reports_are_hidden() {
        let author = Uuid::new_v4();
        let r = report(ReportStatus::Rejected, author);
        assert!(!r.is_visible_to(None));
        assert!(!r.is_visible_to(Some(author)));
    }

    #[test]
    fn test_enums_use_database_spelling() {
        assert_eq!(
            serde_json::to_string(&IssueType::FloodingWaterIssue).unwrap(),
            "\"FLOODING_WATER_ISSUE\""
        );
        assert_eq!(
            serde_json::from_str::<Severity>("\"HIGH\"").unwrap(),
            Severity::High
        );
        assert_eq!(ReportStatus::Approved.to_string(), "APPROVED");
    }
}
