mod auth_service;
mod magic_link_service;
mod session_service;

pub use auth_service::{AuthService, OAuthState, GOOGLE_PROVIDER};
pub use magic_link_service::MagicLinkService;
pub use session_service::{NewSession, SessionService};
