// src/handlers/subscription.rs

use axum::{
    Extension, Json,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    AppState,
    error::AppError,
    models::subscription::{
        ChangePlanRequest, SubscriptionDetails, SubscriptionPush, ToggleAutoRenewRequest,
    },
    utils::jwt::Claims,
};

async fn load_subscription(
    state: &AppState,
    user_id: i64,
) -> Result<SubscriptionDetails, AppError> {
    sqlx::query_as::<_, SubscriptionDetails>("SELECT * FROM subscriptions WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("No subscription found".to_string()))
}

/// Reads the local mirror of the payments collaborator's subscription
/// document. The mirror is source-of-truth-follows: request handlers never
/// write it, only the collaborator's webhook push does.
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = load_subscription(&state, claims.user_id()).await?;
    Ok(Json(subscription))
}

/// Requests cancellation at period end. The mirrored document updates
/// asynchronously once the collaborator pushes the change.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = load_subscription(&state, claims.user_id()).await?;

    state
        .payments
        .cancel_subscription(&subscription.stripe_subscription_id)
        .await?;

    Ok(Json(json!({ "message": "Cancellation requested" })))
}

pub async fn change_plan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let subscription = load_subscription(&state, claims.user_id()).await?;

    state
        .payments
        .update_subscription_plan(&subscription.stripe_subscription_id, &payload.new_price_id)
        .await?;

    Ok(Json(json!({ "message": "Plan change requested" })))
}

pub async fn toggle_auto_renew(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ToggleAutoRenewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = load_subscription(&state, claims.user_id()).await?;

    state
        .payments
        .toggle_auto_renew(
            &subscription.stripe_subscription_id,
            payload.enable_auto_renew,
        )
        .await?;

    Ok(Json(json!({ "message": "Auto-renew updated" })))
}

/// The collaborator's push channel: whenever the remote subscription
/// document changes, it posts the new state here and the mirror is
/// upserted. Authenticated by a shared secret header.
pub async fn subscription_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(push): Json<SubscriptionPush>,
) -> Result<impl IntoResponse, AppError> {
    let presented = headers
        .get("x-webhook-secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if state.config.webhook_secret.is_empty() || presented != state.config.webhook_secret {
        return Err(AppError::AuthError("Invalid webhook secret".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO subscriptions
            (user_id, plan_id, status, cancel_at_period_end, stripe_subscription_id, created, updated)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            plan_id = excluded.plan_id,
            status = excluded.status,
            cancel_at_period_end = excluded.cancel_at_period_end,
            stripe_subscription_id = excluded.stripe_subscription_id,
            updated = excluded.updated
        "#,
    )
    .bind(push.user_id)
    .bind(&push.plan_id)
    .bind(&push.status)
    .bind(push.cancel_at_period_end)
    .bind(&push.stripe_subscription_id)
    .bind(push.created)
    .bind(push.updated)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "message": "Subscription mirror updated" })))
}
