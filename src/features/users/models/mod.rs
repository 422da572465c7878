mod user;

pub use user::{UpsertUser, User, UserRole, UserStatus};
