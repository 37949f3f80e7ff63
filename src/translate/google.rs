//! Google translate backend using the public `translate_a/single` endpoint.
//!
//! The endpoint answers with a positional JSON array:
//! `[[["<translated>", "<original>", ...], ...], null, "<detected language>", ...]`.
//! Element 0 holds one entry per sentence; element 2 is the detected source.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::traits::{TranslateError, Translator};
use crate::routing::LanguageTag;

const DETECT_TARGET: &str = "en";

pub struct GoogleTranslator {
    base_url: String,
    client: Client,
}

/// The parts of a `translate_a/single` answer we use.
#[derive(Debug, PartialEq, Eq)]
struct Translation {
    text: String,
    detected: Option<String>,
}

impl GoogleTranslator {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/translate_a/single", self.base_url)
    }

    async fn request(&self, text: &str, target: &str) -> Result<Translation, TranslateError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Status {
                status,
                body: crate::providers::sanitize_api_error(&body),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Malformed(e.to_string()))?;
        parse_response(&payload)
    }
}

fn parse_response(payload: &Value) -> Result<Translation, TranslateError> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Malformed("missing sentence list".into()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    let detected = payload
        .get(2)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|code| !code.is_empty());

    Ok(Translation { text, detected })
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn detect(&self, text: &str) -> Result<LanguageTag, TranslateError> {
        let translation = self.request(text, DETECT_TARGET).await?;
        let code = translation
            .detected
            .ok_or_else(|| TranslateError::Malformed("no detected language".into()))?;
        Ok(LanguageTag::parse(&code))
    }

    async fn translate(&self, text: &str, target: &LanguageTag) -> Result<String, TranslateError> {
        let translation = self.request(text, target.code()).await?;
        let translated = translation.text.trim();
        if translated.is_empty() {
            return Err(TranslateError::Malformed("empty translation".into()));
        }
        Ok(translated.to_string())
    }

    fn name(&self) -> &str {
        "google"
    }
}
