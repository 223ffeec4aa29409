use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::Config;
use crate::constants::prompts::build_quiz_prompt;
use crate::errors::{AppError, AppResult};

/// Remote quiz generation. Returns the raw completion text; turning it
/// into questions is the parser's job, and a partial yield is acceptable
/// to callers as long as at least one question survives parsing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    async fn generate(&self, source_text: &str, question_count: usize) -> AppResult<String>;
}

/// OpenRouter chat-completions client.
pub struct OpenRouterGenerator {
    client: reqwest::Client,
    api_base: String,
    api_key: SecretString,
    model: String,
}

impl OpenRouterGenerator {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.openrouter_api_base.clone(),
            api_key: config.openrouter_api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl QuizGenerator for OpenRouterGenerator {
    async fn generate(&self, source_text: &str, question_count: usize) -> AppResult<String> {
        let prompt = build_quiz_prompt(source_text, question_count);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.7,
        });

        log::info!(
            "requesting {} questions from model {}",
            question_count,
            self.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Generation("model request timed out".to_string())
                } else {
                    AppError::Generation(format!("model request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            log::warn!("model endpoint returned {}: {}", status, detail);
            return Err(AppError::Generation(format!(
                "model endpoint returned {}",
                status
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("unreadable model response: {}", e)))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.to_string())
            .ok_or_else(|| AppError::Generation("no completion content in response".to_string()))
    }
}
