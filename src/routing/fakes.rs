//! In-memory collaborators for router and gateway tests.

use std::collections::HashMap;

use anyhow::bail;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::LanguageTag;
use crate::channels::{ReplyMessage, ReplySender};
use crate::providers::Provider;
use crate::translate::{TranslateError, Translator};

/// Detects a fixed language (or per-text overrides) and "translates" with a canned string.
#[derive(Default)]
pub struct FakeTranslator {
    detected: Option<LanguageTag>,
    overrides: HashMap<String, LanguageTag>,
    translation: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTranslator {
    pub fn detecting(tag: LanguageTag) -> Self {
        Self {
            detected: Some(tag),
            ..Self::default()
        }
    }

    /// Detection always fails.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, translation: &str) -> Self {
        self.translation = Some(translation.to_string());
        self
    }

    pub fn with_detection_for(mut self, text: &str, tag: LanguageTag) -> Self {
        self.overrides.insert(text.to_string(), tag);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn detect(&self, text: &str) -> Result<LanguageTag, TranslateError> {
        self.calls.lock().push(format!("detect:{text}"));
        self.overrides
            .get(text)
            .or(self.detected.as_ref())
            .cloned()
            .ok_or_else(|| TranslateError::Malformed("detection unavailable".into()))
    }

    async fn translate(&self, text: &str, target: &LanguageTag) -> Result<String, TranslateError> {
        self.calls.lock().push(format!("translate:{target}:{text}"));
        self.translation
            .clone()
            .ok_or_else(|| TranslateError::Malformed("translation unavailable".into()))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Returns a canned completion, or fails when none is set.
#[derive(Default)]
pub struct FakeProvider {
    response: Option<String>,
    /// `(system prompt, message)` per call.
    pub calls: Mutex<Vec<(Option<String>, String)>>,
}

impl FakeProvider {
    pub fn answering(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        _model: &str,
        _temperature: f64,
    ) -> anyhow::Result<String> {
        self.calls
            .lock()
            .push((system_prompt.map(str::to_string), message.to_string()));
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => bail!("FakeProvider API error (429 Too Many Requests): rate limited"),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Records every reply call.
#[derive(Default)]
pub struct FakeReplier {
    fail: bool,
    pub sent: Mutex<Vec<(String, Vec<ReplyMessage>)>>,
}

impl FakeReplier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, Vec<ReplyMessage>)> {
        self.sent.lock().clone()
    }

    /// Text bodies of all replies, in order.
    pub fn bodies(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .flat_map(|(_, messages)| messages.iter())
            .map(|message| match message {
                ReplyMessage::Text { text } => text.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ReplySender for FakeReplier {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> anyhow::Result<()> {
        self.sent
            .lock()
            .push((reply_token.to_string(), messages.to_vec()));
        if self.fail {
            bail!("LINE API error (400 Bad Request): Invalid reply token");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
