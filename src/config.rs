// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Questions per session, by mode.
pub const CUSTOM_QUESTION_COUNT: usize = 10;
pub const INTERVIEW_QUESTION_COUNT: usize = 15;

/// Pass thresholds (rounded percentage). The asymmetry is deliberate:
/// interview sessions are longer and graded more leniently.
pub const CUSTOM_PASS_PERCENTAGE: u32 = 80;
pub const INTERVIEW_PASS_PERCENTAGE: u32 = 66;

/// Interview mode runs one whole-session countdown instead of per-question timers.
pub const INTERVIEW_SESSION_SECONDS: u64 = 20 * 60;

/// Cooldown between verification-email resends.
pub const RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Password-reset codes expire after an hour.
pub const RESET_CODE_TTL_SECONDS: i64 = 60 * 60;

/// The history table shows at most the 10 most recent results per tab.
pub const HISTORY_TABLE_LIMIT: usize = 10;

/// The only category guests and unverified users may start.
pub const RESTRICTED_CATEGORY: &str = "backend-engineer";

/// Single-topic category with no subcategories to pick from.
pub const SINGLE_TOPIC_CATEGORY: &str = "ai";

/// Shown (but never persisted) when feedback generation fails.
pub const FEEDBACK_ERROR_PLACEHOLDER: &str = "error generating feedback";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Public base URL used in verification/reset links.
    pub base_url: String,
    /// Resend API key; emails are skipped (and logged) when absent.
    pub resend_api_key: Option<String>,
    pub ai_api_url: String,
    pub ai_api_key: String,
    pub payments_base_url: String,
    pub payments_api_token: String,
    /// Shared secret the subscription webhook must present.
    pub webhook_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60 * 60 * 24);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let resend_api_key = env::var("RESEND_API_KEY").ok().filter(|k| !k.is_empty());

        let ai_api_url = env::var("AI_API_URL").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
                .to_string()
        });
        let ai_api_key = env::var("AI_API_KEY").unwrap_or_default();

        let payments_base_url = env::var("PAYMENTS_BASE_URL").unwrap_or_default();
        let payments_api_token = env::var("PAYMENTS_API_TOKEN").unwrap_or_default();

        let webhook_secret = env::var("WEBHOOK_SECRET").unwrap_or_default();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            base_url,
            resend_api_key,
            ai_api_url,
            ai_api_key,
            payments_base_url,
            payments_api_token,
            webhook_secret,
        }
    }
}
