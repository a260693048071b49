// src/services/ai.rs

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::AppError;

/// The generative-text collaborator: one operation, freeform prompt in,
/// plain text out. The trait seam exists so the feedback pipeline can be
/// tested with a counting mock instead of the network.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> Result<String, AppError>;
}

/// Gemini REST client (`models/*:generateContent`).
pub struct GeminiClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_url: String, api_key: String) -> Self {
        GeminiClient {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_content(&self, prompt: &str) -> Result<String, AppError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("AI API error: {status} - {text}");
            return Err(AppError::Upstream(format!("AI API returned {status}")));
        }

        let payload: Value = resp.json().await?;
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| AppError::Upstream("AI response had no text candidate".to_string()))?;

        Ok(text.to_string())
    }
}
