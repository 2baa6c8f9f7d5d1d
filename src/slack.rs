//! Slack integration: inbound webhook payload types and the outbound
//! Web API client for chat replies.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::SlackConfig;
use crate::error::ChannelError;

const SLACK_API_BASE: &str = "https://slack.com/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One inbound webhook delivery, either the URL-verification handshake or
/// a message event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub challenge: Option<String>,
    pub event: Option<MessageEvent>,
}

impl WebhookPayload {
    /// The handshake challenge string, if this delivery is one.
    pub fn verification_challenge(&self) -> Option<&str> {
        match self.kind.as_deref() {
            Some("url_verification") => self.challenge.as_deref(),
            _ => None,
        }
    }
}

/// The message portion of an event callback. Fields beyond these are
/// ignored; `ts` doubles as the deduplication identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

/// Outbound reply seam, so the dispatcher can be tested with a recording
/// fake instead of the live Web API.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text` to the given channel.
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChannelError>;
}

/// Slack Web API client.
pub struct SlackClient {
    config: SlackConfig,
    base_url: String,
    client: reqwest::Client,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Self {
        Self::with_base_url(config, SLACK_API_BASE)
    }

    /// Point the client at a different API base (used in tests).
    pub fn with_base_url(config: SlackConfig, base_url: impl Into<String>) -> Self {
        Self {
            config,
            base_url: base_url.into(),
            // Construction happens once at startup; a failure here means
            // no reply could ever be posted.
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build Slack HTTP client"),
        }
    }
}

#[async_trait]
impl Notifier for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChannelError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        let body = serde_json::json!({
            "channel": channel,
            "text": text,
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.config.bot_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                channel: channel.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ChannelError::SendFailed {
                channel: channel.to_string(),
                reason: format!("chat.postMessage returned {}", resp.status()),
            });
        }

        // Slack reports API-level failures inside a 200 body.
        let body: serde_json::Value =
            resp.json().await.map_err(|e| ChannelError::SendFailed {
                channel: channel.to_string(),
                reason: e.to_string(),
            })?;
        if body.get("ok").and_then(serde_json::Value::as_bool) == Some(false) {
            let api_error = body
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown");
            return Err(ChannelError::SendFailed {
                channel: channel.to_string(),
                reason: format!("chat.postMessage error: {api_error}"),
            });
        }

        Ok(())
    }
}
