//! Authentication: server-side sessions, email magic links and Google OAuth.
//!
//! A session middleware resolves the `session_token` cookie on every request
//! and inserts the [`AuthenticatedUser`] into the request extensions; handlers
//! read it through extractors or the guards in [`guards`].

pub mod clients;
pub mod cookies;
pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;
pub mod tokens;

pub use model::{AuthenticatedUser, MaybeUser};
pub use routes::routes;
pub use services::{AuthService, MagicLinkService, SessionService};
