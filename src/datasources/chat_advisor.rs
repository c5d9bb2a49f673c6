//! OpenAI-compatible chat completions client used as the AI crop advisor.
//!
//! Groq is the default endpoint; any service speaking the same
//! `/chat/completions` protocol works.

use crate::config::{AdvisorConfig, AdvisorMode};
use crate::error::{KrishiError, Result};
use crate::logic::advisory::{AdvisorPrompt, CropAdvisor};
use async_trait::async_trait;

pub struct ChatAdvisorClient {
    client: reqwest::Client,
    config: AdvisorConfig,
}

impl ChatAdvisorClient {
    pub fn new(client: reqwest::Client, config: AdvisorConfig) -> Self {
        Self { client, config }
    }

    fn request_body(&self, prompt: &AdvisorPrompt) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        })
    }

    /// Lists models to confirm the key is accepted.
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.api_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
            .map_err(|e| KrishiError::Advisor(format!("{} request failed: {}", self.config.model, e)))?;

        Ok(response.status().is_success())
    }
}

#[async_trait]
impl CropAdvisor for ChatAdvisorClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn mode(&self) -> AdvisorMode {
        self.config.mode
    }

    async fn complete(&self, prompt: &AdvisorPrompt) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| KrishiError::Advisor(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(KrishiError::Advisor(format!(
                "advisor returned {}: {}",
                status, error_body
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| KrishiError::Advisor(format!("response parse failed: {}", e)))?;

        extract_content(&json)
    }
}

/// Pulls `choices[0].message.content` out of a completions response.
fn extract_content(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| KrishiError::Advisor("No response content from advisor".into()))
}
