//! Provider subsystem for chat-completion backends.
//!
//! Every backend implements the [`Provider`] trait defined in [`traits`] and is
//! registered in the factory function [`create_provider`] by its canonical
//! string key. The gateway builds one provider at startup, and only when an API
//! key is configured; without one the assistant path stays disabled.

pub mod compatible;
pub mod traits;

pub use compatible::{AuthStyle, OpenAiCompatibleProvider};
pub use traits::Provider;

const MAX_API_ERROR_CHARS: usize = 200;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

/// Scrub known secret-like token prefixes from provider error strings.
///
/// Redacts tokens with prefixes like `sk-`, `sess-` and `Bearer `.
pub fn scrub_secret_patterns(input: &str) -> String {
    const PREFIXES: [&str; 3] = ["sk-", "sess-", "Bearer "];

    let mut scrubbed = input.to_string();

    for prefix in PREFIXES {
        let mut search_from = 0;
        while let Some(rel) = scrubbed[search_from..].find(prefix) {
            let start = search_from + rel;
            let content_start = start + prefix.len();
            let end = token_end(&scrubbed, content_start);

            if end == content_start {
                search_from = content_start;
                continue;
            }

            scrubbed.replace_range(start..end, "[REDACTED]");
            search_from = start + "[REDACTED]".len();
        }
    }

    scrubbed
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed;
    }

    let end = scrubbed
        .char_indices()
        .nth(MAX_API_ERROR_CHARS)
        .map_or(scrubbed.len(), |(i, _)| i);

    format!("{}...", &scrubbed[..end])
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let sanitized = sanitize_api_error(&body);
    anyhow::anyhow!("{provider} API error ({status}): {sanitized}")
}

/// Factory: create the right provider from config.
///
/// `name` is `"openai"` or `"custom:<base url>"`; `api_url` overrides the
/// default base URL of a named provider.
pub fn create_provider(
    name: &str,
    api_key: Option<&str>,
    api_url: Option<&str>,
) -> anyhow::Result<Box<dyn Provider>> {
    let key = api_key.map(str::trim).filter(|k| !k.is_empty());
    let api_url = api_url.map(str::trim).filter(|u| !u.is_empty());

    if let Some(custom_url) = name.strip_prefix("custom:") {
        let custom_url = custom_url.trim();
        if custom_url.is_empty() {
            anyhow::bail!("Custom provider requires a URL, e.g. \"custom:https://host/v1\"");
        }
        reqwest::Url::parse(custom_url)
            .map_err(|e| anyhow::anyhow!("Invalid custom provider URL {custom_url:?}: {e}"))?;
        return Ok(Box::new(OpenAiCompatibleProvider::new(
            "custom",
            custom_url,
            key,
            AuthStyle::Bearer,
        )));
    }

    match name.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(Box::new(OpenAiCompatibleProvider::new(
            "OpenAI",
            api_url.unwrap_or(OPENAI_BASE_URL),
            key,
            AuthStyle::Bearer,
        ))),
        _ => anyhow::bail!(
            "Unknown provider: {name}. Supported: \"openai\", \"custom:<URL>\"."
        ),
    }
}
