//! `MessageRouter`: runs a routing decision against the collaborators and
//! sends the single reply.

use std::sync::Arc;

use super::compose::{
    assistant_system_prompt, compose_assistant, compose_translation, translation_system_prompt,
    APOLOGY_TEXT, HELP_TEXT,
};
use super::decision::{guess_language, route_language, route_trigger, TriggerSet};
use super::traits::{HandleOutcome, IncomingMessage, LanguageTag, ReplyPayload, RoutingDecision};
use crate::channels::line::format_received_at;
use crate::channels::{ReplyMessage, ReplySender};
use crate::config::Config;
use crate::providers::{scrub_secret_patterns, Provider};
use crate::security::redact;
use crate::translate::{TranslateError, Translator};

/// Read-only knobs the router needs from [`Config`].
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub triggers: TriggerSet,
    pub model: String,
    pub temperature: f64,
    /// Ask the provider before falling back to the translator.
    pub ai_translation: bool,
}

impl RouterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            triggers: TriggerSet::new(&config.assistant.triggers),
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            ai_translation: config.translation.use_ai,
        }
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct MessageRouter {
    translator: Arc<dyn Translator>,
    provider: Option<Arc<dyn Provider>>,
    replier: Arc<dyn ReplySender>,
    settings: RouterSettings,
}

impl MessageRouter {
    /// `provider` is `None` when no API key is configured; the assistant path
    /// and AI translation are then off.
    pub fn new(
        translator: Arc<dyn Translator>,
        provider: Option<Arc<dyn Provider>>,
        replier: Arc<dyn ReplySender>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            translator,
            provider,
            replier,
            settings,
        }
    }

    pub fn ai_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Trigger check, then language detection.
    pub async fn decide(&self, text: &str) -> Result<RoutingDecision, TranslateError> {
        if let Some(decision) = route_trigger(text, &self.settings.triggers, self.ai_enabled()) {
            return Ok(decision);
        }
        let tag = self.translator.detect(text).await?;
        tracing::debug!(language = %tag, "Detected message language");
        Ok(route_language(&tag))
    }

    /// Decide and build the reply body. `Ok(None)` means no reply.
    ///
    /// Errors come only from detection or plain translation; the assistant
    /// path turns its failures into the apology text.
    pub async fn compose(
        &self,
        message: &IncomingMessage,
    ) -> Result<Option<ReplyPayload>, TranslateError> {
        let decision = self.decide(&message.text).await?;
        tracing::info!(
            reply_token = %redact(&message.reply_token),
            decision = decision.kind(),
            received_at = %format_received_at(message.received_at),
            "Routing message"
        );

        let body = match decision {
            RoutingDecision::Ignore => return Ok(None),
            RoutingDecision::Help => HELP_TEXT.to_string(),
            RoutingDecision::AiAssist { question } => self.assist(&question).await,
            RoutingDecision::Translate { source, target } => {
                let translated = self.translate(&message.text, &source, &target).await?;
                compose_translation(&source, &message.text, &target, &translated)
            }
        };
        Ok(Some(ReplyPayload::new(body)))
    }

    /// Handle one message end to end. Sends at most one reply and never fails.
    pub async fn handle(&self, message: &IncomingMessage) -> HandleOutcome {
        let token = redact(&message.reply_token);
        let payload = match self.compose(message).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::debug!(reply_token = %token, "Unsupported language, no reply");
                return HandleOutcome::Ignored;
            }
            Err(e) => {
                tracing::error!(
                    reply_token = %token,
                    error = %e,
                    "Translation failed, no reply sent"
                );
                return HandleOutcome::Dropped;
            }
        };

        match self
            .replier
            .reply(&message.reply_token, &[ReplyMessage::text(payload.body)])
            .await
        {
            Ok(()) => {
                tracing::info!(reply_token = %token, channel = self.replier.name(), "Reply sent");
                HandleOutcome::Replied
            }
            Err(e) => {
                tracing::error!(reply_token = %token, error = %e, "Reply failed");
                HandleOutcome::ReplyFailed
            }
        }
    }

    async fn assist(&self, question: &str) -> String {
        let Some(provider) = &self.provider else {
            return APOLOGY_TEXT.to_string();
        };

        let language = match self.translator.detect(question).await {
            Ok(tag) => tag,
            Err(e) => {
                let guess = guess_language(question);
                tracing::warn!(error = %e, fallback = %guess, "Question language detection failed");
                guess
            }
        };

        match provider
            .chat_with_system(
                Some(assistant_system_prompt(&language)),
                question,
                &self.settings.model,
                self.settings.temperature,
            )
            .await
        {
            Ok(answer) if !answer.trim().is_empty() => compose_assistant(&answer),
            Ok(_) => {
                tracing::error!(provider = provider.name(), "Assistant returned an empty answer");
                APOLOGY_TEXT.to_string()
            }
            Err(e) => {
                tracing::error!(
                    provider = provider.name(),
                    error = %scrub_secret_patterns(&format!("{e:#}")),
                    "Assistant request failed"
                );
                APOLOGY_TEXT.to_string()
            }
        }
    }

    async fn translate(
        &self,
        text: &str,
        source: &LanguageTag,
        target: &LanguageTag,
    ) -> Result<String, TranslateError> {
        if self.settings.ai_translation {
            if let Some(provider) = &self.provider {
                let system = translation_system_prompt(source, target);
                match provider
                    .chat_with_system(
                        Some(&system),
                        text,
                        &self.settings.model,
                        self.settings.temperature,
                    )
                    .await
                {
                    Ok(translated) if !translated.trim().is_empty() => {
                        return Ok(translated.trim().to_string());
                    }
                    Ok(_) => {
                        tracing::warn!(
                            provider = provider.name(),
                            "AI translation was empty, using translator"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            provider = provider.name(),
                            error = %scrub_secret_patterns(&format!("{e:#}")),
                            "AI translation failed, using translator"
                        );
                    }
                }
            }
        }
        self.translator.translate(text, target).await
    }
}
