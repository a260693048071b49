// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    config::{RESEND_COOLDOWN_SECONDS, RESET_CODE_TTL_SECONDS},
    error::AppError,
    models::user::{
        ConfirmPasswordResetRequest, LoginRequest, MeResponse, PasswordResetRequest,
        RegisterRequest, UpdateDisplayNameRequest, User, VerifyEmailRequest,
        VerifyResetCodeRequest,
    },
    services::email,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

async fn fetch_user(state: &AppState, user_id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it, issues a one-time
/// verification token and mails it out. A failed email send is logged but
/// does not fail the registration; the user can ask for a resend.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;
    let verification_token = Uuid::new_v4().to_string();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password, display_name, verification_token, verification_sent_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(&payload.display_name)
    .bind(&verification_token)
    .bind(chrono::Utc::now())
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            AppError::Conflict(format!("Email '{}' is already registered", payload.email))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    let verification_url = format!(
        "{}/verify-email?token={}",
        state.config.base_url, verification_token
    );
    if let Err(e) = email::send_verification_email(
        state.config.resend_api_key.as_deref(),
        &user.email,
        &verification_url,
    )
    .await
    {
        tracing::error!("Failed to send verification email: {:?}", e);
    }

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Login DB error: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let token = sign_jwt(
        user.id,
        user.is_verified,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "is_verified": user.is_verified
    })))
}

/// Consumes a one-time verification token and marks the account verified.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query(
        "UPDATE users SET is_verified = TRUE, verification_token = NULL WHERE verification_token = ?",
    )
    .bind(&payload.token)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::ValidationError(
            "Invalid verification token".to_string(),
        ));
    }

    Ok(Json(json!({ "message": "Email verified successfully" })))
}

/// Re-issues the verification email, behind a cooldown: repeated requests
/// inside the window are rejected with 429 and the seconds left.
pub async fn resend_verification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&state, claims.user_id()).await?;

    if user.is_verified {
        return Err(AppError::Conflict("Email is already verified".to_string()));
    }

    if let Some(sent_at) = user.verification_sent_at {
        let elapsed = (chrono::Utc::now() - sent_at).num_seconds();
        if elapsed < RESEND_COOLDOWN_SECONDS {
            return Err(AppError::RateLimited {
                message: "Verification email was just sent".to_string(),
                retry_after_seconds: RESEND_COOLDOWN_SECONDS - elapsed,
            });
        }
    }

    let verification_token = Uuid::new_v4().to_string();
    sqlx::query("UPDATE users SET verification_token = ?, verification_sent_at = ? WHERE id = ?")
        .bind(&verification_token)
        .bind(chrono::Utc::now())
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    let verification_url = format!(
        "{}/verify-email?token={}",
        state.config.base_url, verification_token
    );
    email::send_verification_email(
        state.config.resend_api_key.as_deref(),
        &user.email,
        &verification_url,
    )
    .await?;

    Ok(Json(json!({ "message": "Verification email sent" })))
}

/// Starts a password reset. Always answers 200 so the endpoint cannot be
/// used to probe which addresses exist.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&state.pool)
        .await?;

    if let Some(user) = user {
        let reset_token = Uuid::new_v4().to_string();
        sqlx::query("UPDATE users SET reset_token = ?, reset_sent_at = ? WHERE id = ?")
            .bind(&reset_token)
            .bind(chrono::Utc::now())
            .bind(user.id)
            .execute(&state.pool)
            .await?;

        let reset_url = format!("{}/reset-password?code={}", state.config.base_url, reset_token);
        if let Err(e) = email::send_password_reset_email(
            state.config.resend_api_key.as_deref(),
            &user.email,
            &reset_url,
        )
        .await
        {
            tracing::error!("Failed to send password reset email: {:?}", e);
        }
    }

    Ok(Json(json!({
        "message": "If that address is registered, a reset email is on its way"
    })))
}

async fn user_for_reset_code(state: &AppState, code: &str) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE reset_token = ?")
        .bind(code)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::ValidationError("Invalid or expired reset code".to_string()))?;

    let fresh = user
        .reset_sent_at
        .map(|sent| (chrono::Utc::now() - sent).num_seconds() < RESET_CODE_TTL_SECONDS)
        .unwrap_or(false);
    if !fresh {
        return Err(AppError::ValidationError(
            "Invalid or expired reset code".to_string(),
        ));
    }

    Ok(user)
}

/// Checks a reset code without consuming it (the reset form calls this
/// before showing the new-password fields).
pub async fn verify_reset_code(
    State(state): State<AppState>,
    Json(payload): Json<VerifyResetCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = user_for_reset_code(&state, &payload.code).await?;
    Ok(Json(json!({ "valid": true, "email": user.email })))
}

/// Consumes a reset code and sets the new password.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmPasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = user_for_reset_code(&state, &payload.code).await?;
    let hashed = hash_password(&payload.new_password)?;

    sqlx::query(
        "UPDATE users SET password = ?, reset_token = NULL, reset_sent_at = NULL WHERE id = ?",
    )
    .bind(&hashed)
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// Get the current user's profile.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&state, claims.user_id()).await?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        is_verified: user.is_verified,
        created_at: user.created_at,
    }))
}

pub async fn update_display_name(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateDisplayNameRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    sqlx::query("UPDATE users SET display_name = ? WHERE id = ?")
        .bind(&payload.display_name)
        .bind(claims.user_id())
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "message": "Display name updated" })))
}

/// Deletes the current user and everything they own.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let mut tx = state.pool.begin().await?;
    sqlx::query("DELETE FROM results WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM daily_attempts WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM subscriptions WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Json(json!({ "message": "Account deleted" })))
}
