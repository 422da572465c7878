use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Id of the single `app_state` row
pub const APP_STATE_ID: i32 = 1;

/// Application-wide singleton row. `last_notification_sent_at` is the
/// debounce timer of admin alert emails.
#[derive(Debug, Clone, FromRow)]
pub struct AppState {
    pub id: i32,
    pub last_notification_sent_at: Option<DateTime<Utc>>,
}
