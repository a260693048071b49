// src/services/payments.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

/// A question record as the payments-side backend generates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub subcategory: Option<String>,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
}

/// The payments/functions collaborator (HTTP, bearer-token authenticated).
/// All subscription mutations go through here; the local mirror is only
/// ever updated by the collaborator's own push.
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    async fn generate_questions(&self, category: &str) -> Result<Vec<GeneratedQuestion>, AppError>;
    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), AppError>;
    async fn update_subscription_plan(
        &self,
        subscription_id: &str,
        new_price_id: &str,
    ) -> Result<(), AppError>;
    async fn toggle_auto_renew(
        &self,
        subscription_id: &str,
        enable_auto_renew: bool,
    ) -> Result<(), AppError>;
}

pub struct HttpPaymentsClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

/// Error payload shape every endpoint of the collaborator uses.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

impl HttpPaymentsClient {
    pub fn new(base_url: String, bearer_token: String) -> Self {
        HttpPaymentsClient {
            client: reqwest::Client::new(),
            base_url,
            bearer_token,
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response, AppError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.bearer_token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .json::<ErrorPayload>()
                .await
                .map(|p| p.error)
                .unwrap_or_else(|_| format!("payments API returned {status}"));
            tracing::error!("Payments API error on {path}: {status} - {message}");
            return Err(AppError::Upstream(message));
        }

        Ok(resp)
    }
}

#[async_trait]
impl PaymentsApi for HttpPaymentsClient {
    async fn generate_questions(&self, category: &str) -> Result<Vec<GeneratedQuestion>, AppError> {
        let resp = self
            .post("/generate-questions", json!({ "category": category }))
            .await?;
        Ok(resp.json().await?)
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), AppError> {
        self.post(
            "/cancel-subscription",
            json!({ "subscriptionId": subscription_id }),
        )
        .await?;
        Ok(())
    }

    async fn update_subscription_plan(
        &self,
        subscription_id: &str,
        new_price_id: &str,
    ) -> Result<(), AppError> {
        self.post(
            "/update-subscription-plan",
            json!({ "subscriptionId": subscription_id, "newPriceId": new_price_id }),
        )
        .await?;
        Ok(())
    }

    async fn toggle_auto_renew(
        &self,
        subscription_id: &str,
        enable_auto_renew: bool,
    ) -> Result<(), AppError> {
        self.post(
            "/toggle-auto-renew",
            json!({ "subscriptionId": subscription_id, "enableAutoRenew": enable_auto_renew }),
        )
        .await?;
        Ok(())
    }
}
