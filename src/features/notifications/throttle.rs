use chrono::{DateTime, Duration, Utc};

/// At most one admin alert per cooldown window
#[derive(Debug, Clone, Copy)]
pub struct AlertThrottle {
    cooldown: Duration,
}

impl AlertThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self::new(Duration::hours(hours))
    }

    /// Latest send time that still allows a new alert at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.cooldown
    }
}
