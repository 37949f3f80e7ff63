use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// One outbound message in a reply call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    Text { text: String },
}

impl ReplyMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Platform reply API.
///
/// A reply token is single-use: callers must invoke [`ReplySender::reply`]
/// at most once per token and must not retry on failure.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<()>;

    fn name(&self) -> &str;
}
