// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique email address, doubles as the login name.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub display_name: String,

    /// Whether the user has confirmed their email address.
    pub is_verified: bool,

    /// One-time email verification token, cleared on use.
    #[serde(skip)]
    pub verification_token: Option<String>,
    #[serde(skip)]
    pub verification_sent_at: Option<chrono::DateTime<chrono::Utc>>,

    /// One-time password reset code, cleared on use.
    #[serde(skip)]
    pub reset_token: Option<String>,
    #[serde(skip)]
    pub reset_sent_at: Option<chrono::DateTime<chrono::Utc>>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Profile data for the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub is_verified: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Display name length must be between 1 and 50 characters."
    ))]
    pub display_name: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDisplayNameRequest {
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyResetCodeRequest {
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmPasswordResetRequest {
    pub code: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}
