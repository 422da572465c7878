/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// SESSION & SIGN-IN
// =============================================================================

/// Cookie carrying the opaque session token
pub const SESSION_COOKIE_NAME: &str = "session_token";

/// Cookie carrying the OAuth `state` between redirect and callback
pub const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

/// Lifetime of a session created at sign-in
pub const SESSION_TTL_DAYS: i64 = 30;

/// Lifetime of a magic-link token
pub const MAGIC_LINK_TTL_HOURS: i64 = 24;

/// Lifetime of the OAuth state cookie
pub const OAUTH_STATE_TTL_MINUTES: i64 = 10;

// =============================================================================
// REPORTS
// =============================================================================

/// Maximum length of a report description
pub const MAX_DESCRIPTION_LENGTH: u64 = 1000;

/// Maximum length of a rejection reason
pub const MAX_REJECTION_REASON_LENGTH: u64 = 500;
