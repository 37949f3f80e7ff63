//! Routing types: language tags, inbound messages, decisions and outcomes.

use chrono::{DateTime, Utc};
use std::fmt;

/// A detected natural language.
///
/// Parsing is case-insensitive and accepts `_` as separator, so `zh-tw`,
/// `zh_TW` and `ZH-TW` are all [`LanguageTag::ZhTw`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LanguageTag {
    ZhTw,
    ZhCn,
    Id,
    En,
    Other(String),
}

impl LanguageTag {
    pub fn parse(code: &str) -> Self {
        let normalized = code.trim().replace('_', "-").to_ascii_lowercase();
        match normalized.as_str() {
            "zh-tw" | "zh-hant" | "zh-hk" | "zh-mo" => Self::ZhTw,
            "zh-cn" | "zh" | "zh-hans" | "zh-sg" => Self::ZhCn,
            "id" | "in" => Self::Id,
            "en" | "en-us" | "en-gb" => Self::En,
            _ => Self::Other(normalized),
        }
    }

    /// Canonical code, as the translation backend expects it.
    pub fn code(&self) -> &str {
        match self {
            Self::ZhTw => "zh-TW",
            Self::ZhCn => "zh-CN",
            Self::Id => "id",
            Self::En => "en",
            Self::Other(code) => code,
        }
    }

    pub fn is_chinese(&self) -> bool {
        matches!(self, Self::ZhTw | Self::ZhCn)
    }

    /// English name, used inside model instructions.
    pub fn english_name(&self) -> &str {
        match self {
            Self::ZhTw => "Traditional Chinese (Taiwan)",
            Self::ZhCn => "Simplified Chinese",
            Self::Id => "Indonesian",
            Self::En => "English",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One inbound text message. Lives for a single reply cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Non-empty, trimmed.
    pub text: String,
    pub source_user_id: Option<String>,
    /// Single-use.
    pub reply_token: String,
    pub received_at: Option<DateTime<Utc>>,
}

/// What to do with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Trigger keyword with nothing after it.
    Help,
    AiAssist {
        question: String,
    },
    Translate {
        source: LanguageTag,
        target: LanguageTag,
    },
    Ignore,
}

impl RoutingDecision {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::AiAssist { .. } => "ai_assist",
            Self::Translate { .. } => "translate",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Help => f.write_str("help"),
            Self::AiAssist { question } => write!(f, "ai_assist({question})"),
            Self::Translate { source, target } => write!(f, "translate({source} -> {target})"),
            Self::Ignore => f.write_str("ignore"),
        }
    }
}

/// Body of the single reply sent for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub body: String,
}

impl ReplyPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// Result of handling one message. Never an error: failures are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    Replied,
    Ignored,
    /// Detection or translation failed; nothing was sent.
    Dropped,
    /// The reply call itself failed.
    ReplyFailed,
}
