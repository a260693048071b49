// src/models/subscription.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'subscriptions' table: a read-only local mirror of the
/// payments collaborator's subscription document. Never mutated by request
/// handlers; the collaborator pushes updates through the webhook.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubscriptionDetails {
    pub user_id: i64,
    pub plan_id: String,
    pub status: String,
    pub cancel_at_period_end: bool,
    pub stripe_subscription_id: String,
    pub created: chrono::DateTime<chrono::Utc>,
    pub updated: chrono::DateTime<chrono::Utc>,
}

/// Webhook payload the payments collaborator pushes when the remote
/// subscription document changes.
#[derive(Debug, Deserialize)]
pub struct SubscriptionPush {
    pub user_id: i64,
    pub plan_id: String,
    pub status: String,
    pub cancel_at_period_end: bool,
    pub stripe_subscription_id: String,
    pub created: chrono::DateTime<chrono::Utc>,
    pub updated: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub new_price_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleAutoRenewRequest {
    pub enable_auto_renew: bool,
}
