use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::models::APP_STATE_ID;
use crate::features::notifications::throttle::AlertThrottle;
use crate::features::reports::models::{Report, ReportStatus};
use crate::features::users::models::User;
use crate::features::users::services::{UnsubscribeSigner, UserService};
use crate::modules::mail::{render_email, EmailTemplate, Mailer, OutgoingEmail};
use crate::shared::i18n::Locale;

#[derive(Serialize)]
struct NewReportContext<'a> {
    dashboard_url: &'a str,
}

#[derive(Serialize)]
struct StatusChangeContext<'a> {
    report_id: String,
    report_url: &'a str,
    unsubscribe_url: &'a str,
    rejection_reason: Option<&'a str>,
}

/// Links embedded in outgoing emails
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    frontend_url: String,
    public_url: String,
}

impl LinkBuilder {
    pub fn new(frontend_url: String, public_url: String) -> Self {
        Self {
            frontend_url,
            public_url,
        }
    }

    pub fn admin_dashboard(&self, locale: Locale) -> String {
        format!("{}/{}/admin", self.frontend_url, locale)
    }

    /// Map page focused on a report
    pub fn report(&self, report_id: Uuid, locale: Locale) -> String {
        format!("{}/{}?reportId={}", self.frontend_url, locale, report_id)
    }

    pub fn unsubscribe(&self, user_id: Uuid, token: &str, locale: Locale) -> String {
        format!(
            "{}/api/unsubscribe?userId={}&token={}&locale={}",
            self.public_url, user_id, token, locale
        )
    }
}

/// Admin alerts and author status emails.
///
/// Every email here is best-effort: failures are logged and never reach the
/// request that triggered them.
pub struct NotificationService {
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
    user_service: Arc<UserService>,
    signer: UnsubscribeSigner,
    throttle: AlertThrottle,
    admin_recipients: Vec<String>,
    links: LinkBuilder,
}

impl NotificationService {
    pub fn new(
        pool: PgPool,
        mailer: Arc<dyn Mailer>,
        user_service: Arc<UserService>,
        signer: UnsubscribeSigner,
        throttle: AlertThrottle,
        admin_recipients: Vec<String>,
        links: LinkBuilder,
    ) -> Self {
        Self {
            pool,
            mailer,
            user_service,
            signer,
            throttle,
            admin_recipients,
            links,
        }
    }

    /// Alert administrators that a report is waiting, at most once per cooldown
    pub async fn notify_new_report(&self) {
        if let Err(e) = self.try_notify_new_report().await {
            tracing::warn!("Admin alert not sent: {}", e);
        }
    }

    async fn try_notify_new_report(&self) -> Result<()> {
        let now = Utc::now();
        let Some(previous) = self.claim_alert_slot(now).await? else {
            tracing::debug!("Admin alert skipped, cooldown still running");
            return Ok(());
        };

        let recipients = match self.resolve_admin_recipients().await {
            Ok(recipients) => recipients,
            Err(e) => {
                self.release_alert_slot(now, previous).await;
                return Err(e);
            }
        };

        if let Err(e) = self.deliver_admin_alert(&recipients).await {
            self.release_alert_slot(now, previous).await;
            return Err(e);
        }

        tracing::info!("Admin alert sent to {} recipient(s)", recipients.len());
        Ok(())
    }

    /// Take the debounce slot. Returns the previous timer value when the slot
    /// was free, `None` when another alert went out within the cooldown.
    async fn claim_alert_slot(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<Option<DateTime<Utc>>>> {
        sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            r#"
            WITH previous AS (
                SELECT last_notification_sent_at
                FROM app_state
                WHERE id = $1
                FOR UPDATE
            )
            UPDATE app_state
            SET last_notification_sent_at = $2
            FROM previous
            WHERE app_state.id = $1
              AND (previous.last_notification_sent_at IS NULL
                   OR previous.last_notification_sent_at <= $3)
            RETURNING previous.last_notification_sent_at
            "#,
        )
        .bind(APP_STATE_ID)
        .bind(now)
        .bind(self.throttle.cutoff(now))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to claim admin alert slot: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Give the slot back after a failed send, unless the timer moved since
    async fn release_alert_slot(&self, claimed_at: DateTime<Utc>, previous: Option<DateTime<Utc>>) {
        let result = sqlx::query(
            r#"
            UPDATE app_state
            SET last_notification_sent_at = $2
            WHERE id = $1 AND last_notification_sent_at = $3
            "#,
        )
        .bind(APP_STATE_ID)
        .bind(previous)
        .bind(claimed_at)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to release admin alert slot: {:?}", e);
        }
    }

    async fn resolve_admin_recipients(&self) -> Result<Vec<String>> {
        if !self.admin_recipients.is_empty() {
            return Ok(self.admin_recipients.clone());
        }
        self.user_service.list_admin_emails().await
    }

    async fn deliver_admin_alert(&self, recipients: &[String]) -> Result<()> {
        if recipients.is_empty() {
            return Err(AppError::Internal(
                "No administrator to notify".to_string(),
            ));
        }

        let locale = Locale::default();
        let dashboard_url = self.links.admin_dashboard(locale);
        let rendered = render_email(
            EmailTemplate::NewReport,
            locale,
            &NewReportContext {
                dashboard_url: &dashboard_url,
            },
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        for to in recipients {
            self.mailer
                .send(OutgoingEmail {
                    to: to.clone(),
                    subject: rendered.subject.clone(),
                    html: rendered.html.clone(),
                })
                .await
                .map_err(|e| AppError::ExternalServiceError(e.to_string()))?;
        }

        Ok(())
    }

    /// Clear the debounce timer so the next submission alerts immediately.
    /// Runs inside the moderation transaction.
    pub async fn reset_alert_timer(conn: &mut PgConnection) -> Result<()> {
        sqlx::query("UPDATE app_state SET last_notification_sent_at = NULL WHERE id = $1")
            .bind(APP_STATE_ID)
            .execute(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to reset admin alert timer: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    /// Tell the author their report was approved or rejected
    pub async fn notify_status_change(&self, report: &Report, author: &User) {
        if !author.notify_on_status_change {
            tracing::debug!("User {} opted out of status emails", author.id);
            return;
        }

        if let Err(e) = self.deliver_status_change(report, author).await {
            tracing::warn!(
                "Status email for report {} not sent to {}: {}",
                report.id,
                author.email,
                e
            );
        }
    }

    async fn deliver_status_change(&self, report: &Report, author: &User) -> Result<()> {
        let template = match report.status {
            ReportStatus::Approved => EmailTemplate::ReportApproved,
            ReportStatus::Rejected => EmailTemplate::ReportRejected,
            other => {
                tracing::debug!("No status email for status {}", other);
                return Ok(());
            }
        };

        let locale = Locale::default();
        let report_url = self.links.report(report.id, locale);
        let unsubscribe_url =
            self.links
                .unsubscribe(author.id, &self.signer.sign(author.id), locale);

        let rendered = render_email(
            template,
            locale,
            &StatusChangeContext {
                report_id: report.id.to_string(),
                report_url: &report_url,
                unsubscribe_url: &unsubscribe_url,
                rejection_reason: report.rejection_reason.as_deref(),
            },
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        self.mailer
            .send(OutgoingEmail {
                to: author.email.clone(),
                subject: rendered.subject,
                html: rendered.html,
            })
            .await
            .map_err(|e| AppError::ExternalServiceError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{IssueType, Severity};
    use crate::features::users::models::{UserRole, UserStatus};
    use crate::shared::test_helpers::{
        alert_timer, insert_user, lazy_pool, set_alert_timer, RecordingMailer,
    };
    use chrono::{Duration, SubsecRound};

    const SECRET: &str = "unit-test-secret-with-enough-length!";

    fn links() -> LinkBuilder {
        LinkBuilder::new(
            "http://web.test".to_string(),
            "http://api.test".to_string(),
        )
    }

    fn service(mailer: Arc<RecordingMailer>, recipients: Vec<String>) -> NotificationService {
        service_on(lazy_pool(), mailer, recipients)
    }

    fn service_on(
        pool: PgPool,
        mailer: Arc<RecordingMailer>,
        recipients: Vec<String>,
    ) -> NotificationService {
        NotificationService::new(
            pool.clone(),
            mailer,
            Arc::new(UserService::new(pool)),
            UnsubscribeSigner::new(SECRET),
            AlertThrottle::from_hours(12),
            recipients,
            links(),
        )
    }

    fn author(notify: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "author@example.test".to_string(),
            name: None,
            image: None,
            email_verified: None,
            role: UserRole::Newcomer,
            status: UserStatus::Active,
            notify_on_status_change: notify,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn report(author_id: Uuid, status: ReportStatus, reason: Option<&str>) -> Report {
        Report {
            id: Uuid::new_v4(),
            author_id,
            status,
            latitude: 44.42,
            longitude: -0.33,
            issue_type: IssueType::Pothole,
            severity: Severity::High,
            description: None,
            photo_url: None,
            rejection_reason: reason.map(str::to_string),
            moderated_by: None,
            moderated_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_links() {
        let links = links();
        let id = Uuid::nil();
        assert_eq!(links.admin_dashboard(Locale::Fr), "http://web.test/fr/admin");
        assert_eq!(
            links.report(id, Locale::En),
            format!("http://web.test/en?reportId={}", id)
        );
        assert_eq!(
            links.unsubscribe(id, "abc", Locale::Fr),
            format!("http://api.test/api/unsubscribe?userId={}&token=abc&locale=fr", id)
        );
    }

    #[tokio::test]
    async fn test_approval_email_carries_signed_unsubscribe_link() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(mailer.clone(), vec![]);
        let author = author(true);

        service
            .notify_status_change(&report(author.id, ReportStatus::Approved, None), &author)
            .await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, author.email);
        assert_eq!(sent[0].subject, "Votre signalement a été approuvé !");

        let token = UnsubscribeSigner::new(SECRET).sign(author.id);
        assert!(sent[0].html.contains(&token));
    }

    #[tokio::test]
    async fn test_rejection_email_includes_reason() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(mailer.clone(), vec![]);
        let author = author(true);

        service
            .notify_status_change(
                &report(author.id, ReportStatus::Rejected, Some("Photo floue")),
                &author,
            )
            .await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html.contains("Photo floue"));
    }

    #[tokio::test]
    async fn test_opted_out_author_gets_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(mailer.clone(), vec![]);
        let author = author(false);

        service
            .notify_status_change(&report(author.id, ReportStatus::Approved, None), &author)
            .await;

        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_mail_failure_is_swallowed() {
        let mailer = Arc::new(RecordingMailer::failing());
        let service = service(mailer.clone(), vec![]);
        let author = author(true);

        // Must not panic or propagate
        service
            .notify_status_change(&report(author.id, ReportStatus::Rejected, None), &author)
            .await;
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_admin_alert_goes_to_every_recipient() {
        let mailer = Arc::new(RecordingMailer::default());
        let recipients = vec!["a@example.test".to_string(), "b@example.test".to_string()];
        let service = service(mailer.clone(), recipients.clone());

        service.deliver_admin_alert(&recipients).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].html.contains("web.test"));
        assert_eq!(sent[1].to, "b@example.test");
    }

    #[tokio::test]
    async fn test_admin_alert_without_recipient_fails() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(mailer, vec![]);
        assert!(service.deliver_admin_alert(&[]).await.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_alert_not_resent_within_cooldown(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service_on(
            pool.clone(),
            mailer.clone(),
            vec!["mairie@example.test".to_string()],
        );

        service.notify_new_report().await;
        service.notify_new_report().await;
        service.notify_new_report().await;

        assert_eq!(mailer.sent().len(), 1);
        assert!(alert_timer(&pool).await.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_alert_sent_again_once_cooldown_elapsed(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service_on(
            pool.clone(),
            mailer.clone(),
            vec!["mairie@example.test".to_string()],
        );

        set_alert_timer(&pool, Some(Utc::now() - Duration::hours(11))).await;
        service.notify_new_report().await;
        assert!(mailer.sent().is_empty());

        set_alert_timer(&pool, Some(Utc::now() - Duration::hours(13))).await;
        service.notify_new_report().await;
        assert_eq!(mailer.sent().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_timer_reset_allows_next_alert(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service_on(
            pool.clone(),
            mailer.clone(),
            vec!["mairie@example.test".to_string()],
        );

        service.notify_new_report().await;

        let mut conn = pool.acquire().await.unwrap();
        NotificationService::reset_alert_timer(&mut conn).await.unwrap();
        drop(conn);
        assert_eq!(alert_timer(&pool).await, None);

        service.notify_new_report().await;
        assert_eq!(mailer.sent().len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_failed_alert_restores_previous_timer(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::failing());
        let service = service_on(
            pool.clone(),
            mailer,
            vec!["mairie@example.test".to_string()],
        );

        service.notify_new_report().await;
        assert_eq!(alert_timer(&pool).await, None);

        let previous = (Utc::now() - Duration::hours(20)).trunc_subsecs(6);
        set_alert_timer(&pool, Some(previous)).await;
        service.notify_new_report().await;
        assert_eq!(alert_timer(&pool).await, Some(previous));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_alert_falls_back_to_admin_accounts(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service_on(pool.clone(), mailer.clone(), vec![]);
        let admin = insert_user(&pool, UserRole::Admin, UserStatus::Active).await;
        insert_user(&pool, UserRole::Citizen, UserStatus::Active).await;

        service.notify_new_report().await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, admin.email);
    }
}
