use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Position of a user on the role ladder.
///
/// NEWCOMER → VISITOR → CITIZEN are earned through approved reports; ADMIN is
/// assigned out of band and never touched by promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Newcomer,
    Visitor,
    Citizen,
    Admin,
}

impl UserRole {
    /// Rank on the ladder, higher is more trusted
    pub fn rank(self) -> u8 {
        match self {
            UserRole::Newcomer => 0,
            UserRole::Visitor => 1,
            UserRole::Citizen => 2,
            UserRole::Admin => 3,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Newcomer => write!(f, "NEWCOMER"),
            UserRole::Visitor => write!(f, "VISITOR"),
            UserRole::Citizen => write!(f, "CITIZEN"),
            UserRole::Admin => write!(f, "ADMIN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Banned,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "ACTIVE"),
            UserStatus::Banned => write!(f, "BANNED"),
        }
    }
}

/// Database model for user
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub role: UserRole,
    pub status: UserStatus,
    pub notify_on_status_change: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_banned(&self) -> bool {
        self.status == UserStatus::Banned
    }
}

/// Profile data used to create or refresh a user at sign-in
#[derive(Debug, Clone, Default)]
pub struct UpsertUser {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub email_verified: bool,
}
