//! LINE Messaging API: webhook payload types, signature verification, and the reply call.

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use std::time::Duration;

use crate::adapters::{http_client, DEFAULT_REQUEST_TIMEOUT};
use crate::channels::inbound::InboundMessage;

const LINE_API_BASE: &str = "https://api.line.me";

/// LINE rejects text messages longer than this many characters.
const MAX_TEXT_CHARS: usize = 5000;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("line channel access token not configured")]
    NotConfigured,
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
}

/// Delivery side of a channel: answer one inbound message.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    /// Channel id (e.g. "line").
    fn id(&self) -> &str;
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), ChannelError>;
}

/// Webhook request body. `events` is required; a body without it is malformed.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl WebhookBody {
    /// Text messages in event order. Non-message events, non-text messages, and events
    /// without a reply token are skipped.
    pub fn text_messages(&self) -> Vec<InboundMessage> {
        self.events
            .iter()
            .filter(|e| e.typ == "message")
            .filter_map(|e| {
                let message = e.message.as_ref().filter(|m| m.typ == "text")?;
                Some(InboundMessage {
                    reply_token: e.reply_token.clone()?,
                    text: message.text.clone()?,
                })
            })
            .collect()
    }
}

/// Check `x-line-signature`: base64(HMAC-SHA256(channel_secret, body)).
pub fn verify_signature(body: &[u8], signature: &str, channel_secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            log::warn!("failed to create HMAC");
            return false;
        }
    };
    mac.update(body);
    let computed = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());
    constant_time_eq(&computed, signature.trim())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Cut to LINE's text limit on a character boundary.
fn clamp_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// Reply client for one LINE channel.
pub struct LineChannel {
    id: String,
    access_token: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(access_token: Option<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| LINE_API_BASE.to_string());
        Self {
            id: "line".to_string(),
            access_token,
            base_url,
            client: http_client(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// POST /v2/bot/message/reply with one text message.
    pub async fn reply_message(&self, reply_token: &str, text: &str) -> Result<(), ChannelError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(ChannelError::NotConfigured)?;
        let url = format!("{}/v2/bot/message/reply", self.base_url);
        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": [{ "type": "text", "text": clamp_text(text) }],
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReplyChannel for LineChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), ChannelError> {
        self.reply_message(reply_token, text).await
    }
}
