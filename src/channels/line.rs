//! LINE Messaging API: webhook payloads and the reply client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::traits::{ReplyMessage, ReplySender};
use crate::routing::IncomingMessage;

/// LINE rejects text messages longer than this many characters.
pub const MAX_TEXT_CHARS: usize = 5000;

// ── Webhook payload ──────────────────────────────────────────────

/// Body of a webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    /// follow, unfollow, join, postback, ...
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    pub message: EventMessage,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text(TextContent),
    /// image, sticker, audio, ...
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
}

/// Parse a raw webhook body.
pub fn parse_webhook(body: &[u8]) -> Result<WebhookBody> {
    serde_json::from_slice(body).context("Invalid LINE webhook body")
}

impl WebhookBody {
    /// Text messages that can be answered, in delivery order.
    ///
    /// Skips non-message events, non-text messages, events without a reply
    /// token, blank texts, and messages sent by `own_user_id`.
    pub fn into_incoming(self, own_user_id: Option<&str>) -> Vec<IncomingMessage> {
        self.events
            .into_iter()
            .filter_map(|event| {
                let WebhookEvent::Message(event) = event else {
                    tracing::debug!("Skipping non-message LINE event");
                    return None;
                };
                let EventMessage::Text(content) = event.message else {
                    tracing::debug!("Skipping non-text LINE message");
                    return None;
                };
                let reply_token = event.reply_token.filter(|t| !t.is_empty())?;
                let text = content.text.trim();
                if text.is_empty() {
                    return None;
                }
                let source_user_id = event.source.and_then(|s| s.user_id);
                if own_user_id.is_some() && source_user_id.as_deref() == own_user_id {
                    tracing::debug!("Skipping message sent by the bot itself");
                    return None;
                }
                Some(IncomingMessage {
                    text: text.to_string(),
                    source_user_id,
                    reply_token,
                    received_at: event
                        .timestamp
                        .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
                })
            })
            .collect()
    }
}

// ── Reply client ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BotInfo {
    user_id: String,
}

/// HTTP client for the LINE Messaging API.
pub struct LineClient {
    api_base: String,
    access_token: String,
    client: Client,
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn clamp_message(message: &ReplyMessage) -> ReplyMessage {
    match message {
        ReplyMessage::Text { text } => ReplyMessage::Text {
            text: truncate_chars(text, MAX_TEXT_CHARS),
        },
    }
}

impl LineClient {
    pub fn new(api_base: &str, access_token: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            client: Client::new(),
        }
    }

    /// The bot's own user ID, used to ignore its own messages.
    pub async fn bot_user_id(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/v2/bot/info", self.api_base))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("LINE bot info request failed")?;

        if !response.status().is_success() {
            return Err(crate::providers::api_error("LINE", response).await);
        }

        let info: BotInfo = response
            .json()
            .await
            .context("Invalid LINE bot info response")?;
        Ok(info.user_id)
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<()> {
        let request = ReplyRequest {
            reply_token,
            messages: messages.iter().map(clamp_message).collect(),
        };

        let response = self
            .client
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .context("LINE reply request failed")?;

        if !response.status().is_success() {
            return Err(crate::providers::api_error("LINE", response).await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "line"
    }
}

/// Timestamp helper for log fields.
pub fn format_received_at(received_at: Option<DateTime<Utc>>) -> String {
    received_at.map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "destination": "Ubot",
        "events": [
            {
                "type": "message",
                "mode": "active",
                "timestamp": 1700000000000,
                "replyToken": "token-1",
                "webhookEventId": "01H",
                "deliveryContext": {"isRedelivery": false},
                "source": {"type": "group", "groupId": "G1", "userId": "U1"},
                "message": {"type": "text", "id": "m1", "quoteToken": "q", "text": "  你好  "}
            },
            {
                "type": "message",
                "replyToken": "token-2",
                "source": {"type": "user", "userId": "U2"},
                "message": {"type": "sticker", "id": "m2", "packageId": "1", "stickerId": "2"}
            },
            {"type": "follow", "replyToken": "token-3", "source": {"type": "user", "userId": "U3"}},
            {
                "type": "message",
                "replyToken": "token-4",
                "source": {"type": "user", "userId": "Ubot"},
                "message": {"type": "text", "id": "m4", "text": "echo"}
            },
            {
                "type": "message",
                "source": {"type": "user", "userId": "U5"},
                "message": {"type": "text", "id": "m5", "text": "no token"}
            }
        ]
    }"#;

    #[test]
    fn parses_full_delivery() {
        let body = parse_webhook(SAMPLE.as_bytes()).unwrap();
        assert_eq!(body.destination.as_deref(), Some("Ubot"));
        assert_eq!(body.events.len(), 5);
        assert!(matches!(body.events[2], WebhookEvent::Unsupported));
    }

    #[test]
    fn extracts_only_answerable_text_messages() {
        let body = parse_webhook(SAMPLE.as_bytes()).unwrap();
        let messages = body.into_incoming(Some("Ubot"));
        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert_eq!(msg.text, "你好");
        assert_eq!(msg.reply_token, "token-1");
        assert_eq!(msg.source_user_id.as_deref(), Some("U1"));
        assert_eq!(
            msg.received_at.map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn own_messages_kept_when_bot_id_unknown() {
        let body = parse_webhook(SAMPLE.as_bytes()).unwrap();
        let messages = body.into_incoming(None);
        let tokens: Vec<&str> = messages.iter().map(|m| m.reply_token.as_str()).collect();
        assert_eq!(tokens, vec!["token-1", "token-4"]);
    }

    #[test]
    fn verification_ping_has_no_events() {
        let body = parse_webhook(br#"{"destination":"U0","events":[]}"#).unwrap();
        assert!(body.into_incoming(None).is_empty());
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_webhook(b"not json").is_err());
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("看護助理", 2), "看護");
        assert_eq!(truncate_chars("abc", 10), "abc");
        let long = "字".repeat(MAX_TEXT_CHARS + 10);
        let ReplyMessage::Text { text } = clamp_message(&ReplyMessage::text(long));
        assert_eq!(text.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn format_received_at_handles_missing() {
        assert_eq!(format_received_at(None), "-");
    }

    #[tokio::test]
    async fn reply_posts_token_and_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/bot/message/reply")
            .match_header("authorization", "Bearer line-token")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "replyToken": "rt-1",
                "messages": [{"type": "text", "text": "halo"}]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = LineClient::new(&server.url(), "line-token");
        client
            .reply("rt-1", &[ReplyMessage::text("halo")])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reply_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2/bot/message/reply")
            .with_status(400)
            .with_body(r#"{"message":"Invalid reply token"}"#)
            .create_async()
            .await;

        let client = LineClient::new(&server.url(), "line-token");
        let err = client
            .reply("used", &[ReplyMessage::text("x")])
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("400"));
        assert!(err.contains("Invalid reply token"));
    }

    #[tokio::test]
    async fn bot_user_id_reads_info() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/bot/info")
            .match_header("authorization", "Bearer line-token")
            .with_status(200)
            .with_body(r#"{"userId":"Ubot","basicId":"@abc","displayName":"Bridge","chatMode":"bot","markAsReadMode":"auto"}"#)
            .create_async()
            .await;

        let client = LineClient::new(&server.url(), "line-token");
        assert_eq!(client.bot_user_id().await.unwrap(), "Ubot");
    }
}
