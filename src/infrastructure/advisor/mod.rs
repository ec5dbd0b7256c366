// src/infrastructure/advisor/mod.rs
// OpenAI-compatible chat-completion client

use async_trait::async_trait;
use serde_json::json;

use crate::domain::errors::{AdvisorError, AdvisorResult};
use crate::domain::repository::Advisor;

/// Talks to any OpenAI-compatible `/chat/completions` endpoint and
/// hands back the raw response JSON so the caller can persist the
/// reply exactly as received.
pub struct ChatAdvisor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatAdvisor {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Advisor for ChatAdvisor {
    async fn complete(&self, prompt: &str, temperature: f32) -> AdvisorResult<serde_json::Value> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisorError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AdvisorError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))
    }
}
