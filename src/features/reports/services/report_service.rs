use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::NotificationService;
use crate::features::reports::dtos::{ModerateReportDto, ReportListQuery};
use crate::features::reports::models::{NewReport, PendingReport, Report, ReportStatus};
use crate::features::reports::policy::ModerationPolicy;
use crate::features::users::models::UserRole;
use crate::features::users::services::UserService;
use crate::shared::types::PaginationQuery;

const REPORT_COLUMNS: &str = r#"
    id, author_id, status, latitude, longitude, issue_type, severity,
    description, photo_url, rejection_reason, moderated_by, moderated_at,
    created_at, updated_at
"#;

/// Result of a moderation decision
#[derive(Debug)]
pub struct ModerationOutcome {
    pub report: Report,
    /// New role of the author when the approval promoted them
    pub promoted_to: Option<UserRole>,
}

/// Service for report submission, listing and moderation
pub struct ReportService {
    pool: PgPool,
    policy: ModerationPolicy,
    user_service: Arc<UserService>,
    notification_service: Arc<NotificationService>,
}

impl ReportService {
    pub fn new(
        pool: PgPool,
        policy: ModerationPolicy,
        user_service: Arc<UserService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            pool,
            policy,
            user_service,
            notification_service,
        }
    }

    pub fn policy(&self) -> &ModerationPolicy {
        &self.policy
    }

    /// Create a PENDING report for `author`
    pub async fn submit(&self, author: &AuthenticatedUser, data: NewReport) -> Result<Report> {
        self.policy.check_submitter(author)?;

        let mut tx = self.pool.begin().await?;

        if self.policy.is_rate_limited(author.role) {
            // Serialize submissions of one user so the count below stays exact
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(author.id.to_string())
                .execute(&mut *tx)
                .await?;

            let recent: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM reports
                WHERE author_id = $1 AND created_at >= $2
                "#,
            )
            .bind(author.id)
            .bind(self.policy.window_start(Utc::now()))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count recent reports: {:?}", e);
                AppError::Database(e)
            })?;

            self.policy.check_rate(author.role, recent)?;
        }

        let (description, photo_url) = if self.policy.allows_attachments(author.role) {
            (data.description, data.photo_url)
        } else {
            if data.description.is_some() || data.photo_url.is_some() {
                tracing::debug!(
                    "Dropping description/photo of VISITOR report by {}",
                    author.id
                );
            }
            (None, None)
        };

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (author_id, latitude, longitude, issue_type, severity, description, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(author.id)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(data.issue_type)
        .bind(data.severity)
        .bind(description)
        .bind(photo_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create report: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!("Report {} submitted by {}", report.id, author.id);

        Ok(report)
    }

    /// Alert administrators in the background so the submitter never waits on SMTP
    pub fn alert_new_report(&self) {
        let notifications = Arc::clone(&self.notification_service);
        tokio::spawn(async move {
            notifications.notify_new_report().await;
        });
    }

    /// Reports on the map for `viewer`: APPROVED ones plus the viewer's own PENDING ones
    pub async fn list_visible(
        &self,
        viewer: Option<Uuid>,
        query: &ReportListQuery,
    ) -> Result<Vec<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {}
            FROM reports
            WHERE (status = 'APPROVED' OR (status = 'PENDING' AND author_id = $1))
              AND ($2::report_severity IS NULL OR severity = $2)
              AND ($3::issue_type IS NULL OR issue_type = $3)
            ORDER BY created_at DESC
            "#,
            REPORT_COLUMNS
        ))
        .bind(viewer)
        .bind(query.severity)
        .bind(query.issue_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Single report, hidden (404) when `viewer` may not see it
    pub async fn get_visible(&self, id: Uuid, viewer: Option<Uuid>) -> Result<Report> {
        self.find(id)
            .await?
            .filter(|r| r.is_visible_to(viewer))
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Moderation queue, oldest first
    pub async fn list_pending(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<PendingReport>, i64)> {
        let reports = sqlx::query_as::<_, PendingReport>(
            r#"
            SELECT
                r.id, r.author_id, r.status, r.latitude, r.longitude, r.issue_type, r.severity,
                r.description, r.photo_url, r.rejection_reason, r.moderated_by, r.moderated_at,
                r.created_at, r.updated_at,
                u.email AS author_email
            FROM reports r
            JOIN users u ON u.id = r.author_id
            WHERE r.status = 'PENDING'
            ORDER BY r.created_at ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list pending reports: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE status = 'PENDING'")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count pending reports: {:?}", e);
                    AppError::Database(e)
                })?;

        Ok((reports, total))
    }

    /// Approve or reject a pending report.
    ///
    /// The status change, the author's promotion and the reset of the admin
    /// alert timer commit together. The author is emailed after commit.
    pub async fn moderate(
        &self,
        id: Uuid,
        dto: &ModerateReportDto,
        moderator_id: Uuid,
    ) -> Result<ModerationOutcome> {
        self.policy.check_target(dto.status)?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, ReportStatus>(
            "SELECT status FROM reports WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock report: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        self.policy.check_transition(current, dto.status)?;

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = $2,
                rejection_reason = $3,
                moderated_by = $4,
                moderated_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(dto.status)
        .bind(dto.stored_reason())
        .bind(moderator_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?;

        let mut promoted_to = None;

        if report.status == ReportStatus::Approved {
            let role = sqlx::query_scalar::<_, UserRole>(
                "SELECT role FROM users WHERE id = $1 FOR UPDATE",
            )
            .bind(report.author_id)
            .fetch_one(&mut *tx)
            .await?;

            let approved: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM reports WHERE author_id = $1 AND status = 'APPROVED'",
            )
            .bind(report.author_id)
            .fetch_one(&mut *tx)
            .await?;

            if let Some(new_role) = self.policy.promotion_for(role, approved) {
                sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
                    .bind(report.author_id)
                    .bind(new_role)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to promote user: {:?}", e);
                        AppError::Database(e)
                    })?;

                tracing::info!(
                    "User {} promoted {} -> {} ({} approved reports)",
                    report.author_id,
                    role,
                    new_role,
                    approved
                );
                promoted_to = Some(new_role);
            }

            NotificationService::reset_alert_timer(&mut tx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Report {} moderated {} by {}",
            report.id,
            report.status,
            moderator_id
        );

        match self.user_service.get_by_id(report.author_id).await {
            Ok(author) => {
                self.notification_service
                    .notify_status_change(&report, &author)
                    .await
            }
            Err(e) => tracing::warn!("Could not load author of report {}: {}", report.id, e),
        }

        Ok(ModerationOutcome {
            report,
            promoted_to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notifications::{AlertThrottle, LinkBuilder};
    use crate::features::reports::models::{IssueType, Severity};
    use crate::features::users::models::UserStatus;
    use crate::features::users::services::UnsubscribeSigner;
    use crate::shared::test_helpers::{
        alert_timer, insert_report, insert_user, set_alert_timer, RecordingMailer,
    };
    use chrono::Duration;

    fn service(pool: PgPool, mailer: Arc<RecordingMailer>) -> ReportService {
        let user_service = Arc::new(UserService::new(pool.clone()));
        let notification_service = Arc::new(NotificationService::new(
            pool.clone(),
            mailer,
            Arc::clone(&user_service),
            UnsubscribeSigner::new("unit-test-secret-with-enough-length!"),
            AlertThrottle::from_hours(12),
            vec!["mairie@example.test".to_string()],
            LinkBuilder::new("http://web.test".to_string(), "http://api.test".to_string()),
        ));
        ReportService::new(
            pool,
            ModerationPolicy::default(),
            user_service,
            notification_service,
        )
    }

    fn new_report() -> NewReport {
        NewReport {
            latitude: 44.42,
            longitude: -0.33,
            issue_type: IssueType::Pothole,
            severity: Severity::Medium,
            description: Some("Nid de poule devant l'école".to_string()),
            photo_url: Some("https://cdn.example.test/photo.jpg".to_string()),
        }
    }

    fn decision(status: ReportStatus, reason: Option<&str>) -> ModerateReportDto {
        ModerateReportDto {
            status,
            rejection_reason: reason.map(str::to_string),
        }
    }

    async fn role_of(pool: &PgPool, user_id: Uuid) -> UserRole {
        UserService::new(pool.clone())
            .get_by_id(user_id)
            .await
            .unwrap()
            .role
    }

    async fn report_count(pool: &PgPool, author_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_banned_submission_creates_no_row(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let banned = insert_user(&pool, UserRole::Citizen, UserStatus::Banned).await;

        let err = service.submit(&banned, new_report()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(report_count(&pool, banned.id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_pending_reports_visible_to_owner_only(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let owner = insert_user(&pool, UserRole::Newcomer, UserStatus::Active).await;
        let other = insert_user(&pool, UserRole::Citizen, UserStatus::Active).await;
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        let query = ReportListQuery::default();

        let first = service.submit(&owner, new_report()).await.unwrap();
        let second = service.submit(&owner, new_report()).await.unwrap();
        assert_eq!(first.status, ReportStatus::Pending);

        assert_eq!(service.list_visible(Some(owner.id), &query).await.unwrap().len(), 2);
        assert!(service.list_visible(Some(other.id), &query).await.unwrap().is_empty());
        assert!(service.list_visible(None, &query).await.unwrap().is_empty());

        service
            .moderate(first.id, &decision(ReportStatus::Approved, None), admin.id)
            .await
            .unwrap();

        let public = service.list_visible(None, &query).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, first.id);
        assert_eq!(service.list_visible(Some(other.id), &query).await.unwrap().len(), 1);
        assert_eq!(service.list_visible(Some(owner.id), &query).await.unwrap().len(), 2);

        let hidden = service.get_visible(second.id, Some(other.id)).await.unwrap_err();
        assert!(matches!(hidden, AppError::NotFound(_)));
        assert!(service.get_visible(second.id, None).await.is_err());
        assert_eq!(
            service.get_visible(second.id, Some(owner.id)).await.unwrap().id,
            second.id
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_rejected_reports_stay_hidden_from_owner(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let owner = insert_user(&pool, UserRole::Newcomer, UserStatus::Active).await;
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        let id = insert_report(&pool, owner.id, ReportStatus::Pending, Duration::zero()).await;

        service
            .moderate(id, &decision(ReportStatus::Rejected, Some("Doublon")), admin.id)
            .await
            .unwrap();

        assert!(service
            .list_visible(Some(owner.id), &ReportListQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_filters_by_severity_and_type(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let author = insert_user(&pool, UserRole::Citizen, UserStatus::Active).await;
        insert_report(&pool, author.id, ReportStatus::Approved, Duration::zero()).await;

        let low = ReportListQuery {
            severity: Some(Severity::Low),
            issue_type: None,
        };
        let high = ReportListQuery {
            severity: Some(Severity::High),
            issue_type: None,
        };
        let flooding = ReportListQuery {
            severity: None,
            issue_type: Some(IssueType::FloodingWaterIssue),
        };

        assert_eq!(service.list_visible(None, &low).await.unwrap().len(), 1);
        assert!(service.list_visible(None, &high).await.unwrap().is_empty());
        assert!(service.list_visible(None, &flooding).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_visitor_limited_to_ten_reports_a_day(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let visitor = insert_user(&pool, UserRole::Visitor, UserStatus::Active).await;

        // Older reports fall outside the window
        for _ in 0..3 {
            insert_report(&pool, visitor.id, ReportStatus::Approved, Duration::hours(25)).await;
        }

        for _ in 0..9 {
            service.submit(&visitor, new_report()).await.unwrap();
        }
        // 9 in the window: the 10th still goes through
        let tenth = service.submit(&visitor, new_report()).await.unwrap();
        assert_eq!(tenth.description, None);
        assert_eq!(tenth.photo_url, None);

        let err = service.submit(&visitor, new_report()).await.unwrap_err();
        assert!(matches!(err, AppError::RateLimitExceeded(_)));
        assert_eq!(report_count(&pool, visitor.id).await, 13);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_citizen_has_no_daily_limit(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let citizen = insert_user(&pool, UserRole::Citizen, UserStatus::Active).await;
        for _ in 0..10 {
            insert_report(&pool, citizen.id, ReportStatus::Pending, Duration::zero()).await;
        }

        let report = service.submit(&citizen, new_report()).await.unwrap();
        assert!(report.description.is_some());
        assert!(report.photo_url.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_first_approval_promotes_newcomer(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(pool.clone(), mailer.clone());
        let author = insert_user(&pool, UserRole::Newcomer, UserStatus::Active).await;
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        let id = insert_report(&pool, author.id, ReportStatus::Pending, Duration::zero()).await;

        let outcome = service
            .moderate(id, &decision(ReportStatus::Approved, Some("ignored")), admin.id)
            .await
            .unwrap();

        assert_eq!(outcome.promoted_to, Some(UserRole::Visitor));
        assert_eq!(outcome.report.status, ReportStatus::Approved);
        assert_eq!(outcome.report.rejection_reason, None);
        assert_eq!(outcome.report.moderated_by, Some(admin.id));
        assert_eq!(role_of(&pool, author.id).await, UserRole::Visitor);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, author.email);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_hundredth_approval_promotes_visitor(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let author = insert_user(&pool, UserRole::Visitor, UserStatus::Active).await;
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        for _ in 0..98 {
            insert_report(&pool, author.id, ReportStatus::Approved, Duration::days(3)).await;
        }
        let ninety_ninth =
            insert_report(&pool, author.id, ReportStatus::Pending, Duration::zero()).await;
        let hundredth =
            insert_report(&pool, author.id, ReportStatus::Pending, Duration::zero()).await;

        let outcome = service
            .moderate(ninety_ninth, &decision(ReportStatus::Approved, None), admin.id)
            .await
            .unwrap();
        assert_eq!(outcome.promoted_to, None);
        assert_eq!(role_of(&pool, author.id).await, UserRole::Visitor);

        let outcome = service
            .moderate(hundredth, &decision(ReportStatus::Approved, None), admin.id)
            .await
            .unwrap();
        assert_eq!(outcome.promoted_to, Some(UserRole::Citizen));
        assert_eq!(role_of(&pool, author.id).await, UserRole::Citizen);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_admin_author_is_never_promoted(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        let id = insert_report(&pool, admin.id, ReportStatus::Pending, Duration::zero()).await;

        let outcome = service
            .moderate(id, &decision(ReportStatus::Approved, None), admin.id)
            .await
            .unwrap();
        assert_eq!(outcome.promoted_to, None);
        assert_eq!(role_of(&pool, admin.id).await, UserRole::Admin);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_approval_clears_alert_timer(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let author = insert_user(&pool, UserRole::Newcomer, UserStatus::Active).await;
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        let id = insert_report(&pool, author.id, ReportStatus::Pending, Duration::zero()).await;
        set_alert_timer(&pool, Some(Utc::now())).await;

        service
            .moderate(id, &decision(ReportStatus::Approved, None), admin.id)
            .await
            .unwrap();

        assert_eq!(alert_timer(&pool).await, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_rejection_stores_reason_and_keeps_timer(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let author = insert_user(&pool, UserRole::Newcomer, UserStatus::Active).await;
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        let id = insert_report(&pool, author.id, ReportStatus::Pending, Duration::zero()).await;
        set_alert_timer(&pool, Some(Utc::now())).await;

        let outcome = service
            .moderate(
                id,
                &decision(ReportStatus::Rejected, Some("  Photo floue ")),
                admin.id,
            )
            .await
            .unwrap();

        assert_eq!(outcome.report.rejection_reason.as_deref(), Some("Photo floue"));
        assert_eq!(outcome.promoted_to, None);
        assert_eq!(role_of(&pool, author.id).await, UserRole::Newcomer);
        assert!(alert_timer(&pool).await.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_moderated_report_cannot_be_moderated_again(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let author = insert_user(&pool, UserRole::Newcomer, UserStatus::Active).await;
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        let id = insert_report(&pool, author.id, ReportStatus::Pending, Duration::zero()).await;

        service
            .moderate(id, &decision(ReportStatus::Approved, None), admin.id)
            .await
            .unwrap();

        let err = service
            .moderate(id, &decision(ReportStatus::Rejected, Some("Trop tard")), admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let missing = service
            .moderate(Uuid::new_v4(), &decision(ReportStatus::Approved, None), admin.id)
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_pending_queue_is_oldest_first_with_author(pool: PgPool) {
        let service = service(pool.clone(), Arc::new(RecordingMailer::default()));
        let author = insert_user(&pool, UserRole::Newcomer, UserStatus::Active).await;
        let newer = insert_report(&pool, author.id, ReportStatus::Pending, Duration::hours(1)).await;
        let older = insert_report(&pool, author.id, ReportStatus::Pending, Duration::hours(5)).await;
        insert_report(&pool, author.id, ReportStatus::Approved, Duration::hours(9)).await;

        let (pending, total) = service
            .list_pending(&PaginationQuery::default())
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert_eq!(pending[0].report.id, older);
        assert_eq!(pending[1].report.id, newer);
        assert_eq!(pending[0].author_email, author.email);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_new_report_alert_runs_in_background(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(pool.clone(), mailer.clone());

        service.alert_new_report();

        for _ in 0..100 {
            if !mailer.sent().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "mairie@example.test");
        assert!(alert_timer(&pool).await.is_some());
    }
}
