// src/services/email.rs

use serde::Serialize;

use crate::error::AppError;

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

async fn send(api_key: &str, to_email: &str, subject: &str, html: String) -> Result<(), AppError> {
    let client = reqwest::Client::new();

    let body = SendEmailRequest {
        from: "QuizPrep <noreply@quizprep.app>".to_string(),
        to: vec![to_email.to_string()],
        subject: subject.to_string(),
        html,
    };

    let resp = client
        .post("https://api.resend.com/emails")
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        tracing::error!("Resend API error: {status} - {text}");
        return Err(AppError::Upstream(format!("Resend API returned {status}")));
    }

    Ok(())
}

/// Send a verification email via the Resend API.
/// Skipped (with a log line) when no API key is configured.
pub async fn send_verification_email(
    api_key: Option<&str>,
    to_email: &str,
    verification_url: &str,
) -> Result<(), AppError> {
    let Some(api_key) = api_key else {
        tracing::info!("RESEND_API_KEY not set, skipping verification email to {to_email}");
        return Ok(());
    };

    let html = format!(
        r#"<h2>Welcome to QuizPrep!</h2>
<p>Click the link below to verify your email address:</p>
<p><a href="{verification_url}">{verification_url}</a></p>
<p>This link expires in 24 hours.</p>"#
    );

    send(api_key, to_email, "Verify your QuizPrep account", html).await?;
    tracing::info!("verification email sent to {to_email}");
    Ok(())
}

/// Send a password reset email via the Resend API.
pub async fn send_password_reset_email(
    api_key: Option<&str>,
    to_email: &str,
    reset_url: &str,
) -> Result<(), AppError> {
    let Some(api_key) = api_key else {
        tracing::info!("RESEND_API_KEY not set, skipping password reset email to {to_email}");
        return Ok(());
    };

    let html = format!(
        r#"<h2>Password Reset</h2>
<p>Click the link below to reset your password:</p>
<p><a href="{reset_url}">{reset_url}</a></p>
<p>This link expires in 1 hour.</p>
<p>If you did not request this, you can safely ignore this email.</p>"#
    );

    send(api_key, to_email, "Reset your QuizPrep password", html).await?;
    tracing::info!("password reset email sent to {to_email}");
    Ok(())
}
