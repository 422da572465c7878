//! Moderation rules: who may submit, how often, which transitions are legal,
//! and when authors climb the role ladder.

use chrono::{DateTime, Duration, Utc};

use crate::core::config::ModerationConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::models::ReportStatus;
use crate::features::users::models::UserRole;

#[derive(Debug, Clone)]
pub struct ModerationPolicy {
    visitor_report_limit: i64,
    visitor_window: Duration,
    visitor_threshold: i64,
    citizen_threshold: i64,
}

impl From<&ModerationConfig> for ModerationPolicy {
    fn from(config: &ModerationConfig) -> Self {
        Self {
            visitor_report_limit: config.visitor_report_limit,
            visitor_window: Duration::hours(config.visitor_window_hours),
            visitor_threshold: config.visitor_threshold,
            citizen_threshold: config.citizen_threshold,
        }
    }
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self::from(&ModerationConfig::default())
    }
}

impl ModerationPolicy {
    pub fn check_submitter(&self, user: &AuthenticatedUser) -> Result<()> {
        if user.is_banned() {
            return Err(AppError::Forbidden(
                "Your account has been banned.".to_string(),
            ));
        }
        Ok(())
    }

    /// Only VISITORs are rate limited
    pub fn is_rate_limited(&self, role: UserRole) -> bool {
        role == UserRole::Visitor
    }

    /// Start of the trailing window counted by the rate limit
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.visitor_window
    }

    /// `recent_count` is the number of reports created since [`Self::window_start`]
    pub fn check_rate(&self, role: UserRole, recent_count: i64) -> Result<()> {
        if self.is_rate_limited(role) && recent_count >= self.visitor_report_limit {
            return Err(AppError::RateLimitExceeded(format!(
                "You have reached the limit of {} reports per {} hours.",
                self.visitor_report_limit,
                self.visitor_window.num_hours()
            )));
        }
        Ok(())
    }

    /// VISITOR reports are location, type and severity only
    pub fn allows_attachments(&self, role: UserRole) -> bool {
        role != UserRole::Visitor
    }

    /// Role earned by an author with `approved_count` approved reports.
    /// Returns `None` when the role does not change. Never demotes and never
    /// touches administrators.
    pub fn promotion_for(&self, current: UserRole, approved_count: i64) -> Option<UserRole> {
        if current == UserRole::Admin {
            return None;
        }

        let earned = if approved_count >= self.citizen_threshold {
            UserRole::Citizen
        } else if approved_count >= self.visitor_threshold {
            UserRole::Visitor
        } else {
            UserRole::Newcomer
        };

        (earned.rank() > current.rank()).then_some(earned)
    }

    /// Moderators may only approve or reject
    pub fn check_target(&self, target: ReportStatus) -> Result<()> {
        match target {
            ReportStatus::Approved | ReportStatus::Rejected => Ok(()),
            other => Err(AppError::BadRequest(format!(
                "Invalid status {}. Expected APPROVED or REJECTED",
                other
            ))),
        }
    }

    /// A report is moderated once, while PENDING
    pub fn check_transition(&self, current: ReportStatus, target: ReportStatus) -> Result<()> {
        self.check_target(target)?;
        if current != ReportStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Report has already been moderated ({})",
                current
            )));
        }
        Ok(())
    }
}
