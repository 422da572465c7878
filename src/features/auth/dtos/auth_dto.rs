use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::shared::i18n::Locale;

/// Request a magic sign-in link
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmailSignInDto {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "jeanne@example.fr")]
    pub email: String,
    /// Language of the email and of the landing page
    pub locale: Option<Locale>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailSignInResponseDto {
    pub email: String,
}

/// Query string of the link sent by email
#[derive(Debug, Deserialize, IntoParams)]
pub struct EmailCallbackQuery {
    pub token: String,
    pub email: String,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GoogleSignInQuery {
    pub locale: Option<String>,
}

/// Query string Google redirects back with
#[derive(Debug, Deserialize, IntoParams)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Google when the user denied access
    pub error: Option<String>,
}
