pub mod auth;
pub mod files;
pub mod notifications;
pub mod reports;
pub mod users;
