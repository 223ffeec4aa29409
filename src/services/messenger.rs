use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::domain::OutboundContent;

/// Messaging transport. Callers log and swallow delivery failures; a lost
/// message must never crash the webhook handler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn deliver(&self, user_id: &str, content: &OutboundContent) -> AppResult<()>;

    /// Registers the platform's Get Started button. Called once at startup;
    /// failure is non-fatal.
    async fn setup_get_started(&self) -> AppResult<()>;
}

/// Graph API implementation of the transport.
pub struct GraphApiSender {
    client: reqwest::Client,
    api_base: String,
    page_access_token: SecretString,
}

impl GraphApiSender {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.graph_api_base.clone(),
            page_access_token: config.page_access_token.clone(),
        })
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> AppResult<()> {
        let response = self
            .client
            .post(format!("{}{}", self.api_base, path))
            .query(&[("access_token", self.page_access_token.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("send failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Transport(format!(
                "messaging API returned {}: {}",
                status, detail
            )));
        }
        Ok(())
    }
}

/// Builds the `message` object for one content variant.
fn message_body(content: &OutboundContent) -> serde_json::Value {
    match content {
        OutboundContent::Text(text) => serde_json::json!({ "text": text }),
        OutboundContent::QuickReplies { text, labels } => {
            let quick_replies: Vec<serde_json::Value> = labels
                .iter()
                .map(|label| {
                    serde_json::json!({
                        "content_type": "text",
                        "title": label,
                        "payload": label,
                    })
                })
                .collect();
            serde_json::json!({ "text": text, "quick_replies": quick_replies })
        }
        OutboundContent::Buttons { text, buttons } => {
            let buttons: Vec<serde_json::Value> = buttons
                .iter()
                .map(|button| {
                    serde_json::json!({
                        "type": "postback",
                        "title": button.title,
                        "payload": button.payload,
                    })
                })
                .collect();
            serde_json::json!({
                "attachment": {
                    "type": "template",
                    "payload": {
                        "template_type": "button",
                        "text": text,
                        "buttons": buttons,
                    }
                }
            })
        }
    }
}

#[async_trait]
impl MessageSender for GraphApiSender {
    async fn deliver(&self, user_id: &str, content: &OutboundContent) -> AppResult<()> {
        let body = serde_json::json!({
            "recipient": { "id": user_id },
            "message": message_body(content),
        });
        self.post("/me/messages", body).await
    }

    async fn setup_get_started(&self) -> AppResult<()> {
        let body = serde_json::json!({
            "get_started": { "payload": "GET_STARTED" }
        });
        self.post("/me/messenger_profile", body).await?;
        log::info!("Get Started button registered");
        Ok(())
    }
}
