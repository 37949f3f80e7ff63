use async_trait::async_trait;

/// Chat-completion backend used by the assistant and AI translation paths.
///
/// One call is one system-instruction + user-text exchange; no history is kept.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send `message` with an optional system instruction and return the completion text.
    ///
    /// Fails on transport errors, non-2xx statuses (rate limit, auth) and
    /// responses without usable text.
    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String>;

    /// Provider name for logs and errors.
    fn name(&self) -> &str;
}
