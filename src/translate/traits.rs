use async_trait::async_trait;

use crate::routing::LanguageTag;

/// Errors from the translation backend.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("translation service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed translation response: {0}")]
    Malformed(String),
}

/// Language detection and machine translation.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Detect the language of `text`.
    async fn detect(&self, text: &str) -> Result<LanguageTag, TranslateError>;

    /// Translate `text` into `target`.
    async fn translate(&self, text: &str, target: &LanguageTag) -> Result<String, TranslateError>;

    fn name(&self) -> &str;
}
