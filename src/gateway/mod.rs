//! Axum HTTP gateway for the LINE webhook.
//!
//! - `POST /callback`: signed webhook deliveries
//! - `GET /`, `GET /health`: liveness
//!
//! Request bodies are capped at `gateway.max_body_bytes` (64KB by default).

pub mod webhook;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::channels::LineClient;
use crate::config::Config;
use crate::providers::{self, Provider};
use crate::routing::{MessageRouter, RouterSettings};
use crate::security::redact;
use crate::translate;

/// Shared state for all axum handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<MessageRouter>,
    pub channel_secret: Arc<str>,
    /// Messages from this user are skipped.
    pub own_user_id: Option<Arc<str>>,
}

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(webhook::handle_health))
        .route("/health", get(webhook::handle_health))
        .route("/callback", post(webhook::handle_callback))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
}

/// Build the provider when an API key is configured. Failures disable the assistant.
fn build_provider(config: &Config) -> Option<Arc<dyn Provider>> {
    if !config.ai_enabled() {
        tracing::warn!("No API key configured, assistant and AI translation disabled");
        return None;
    }
    match providers::create_provider(
        &config.default_provider,
        config.api_key.as_deref(),
        config.api_url.as_deref(),
    ) {
        Ok(provider) => {
            tracing::info!(
                provider = provider.name(),
                model = %config.default_model,
                api_key = %redact(config.api_key.as_deref().unwrap_or_default()),
                "Assistant enabled"
            );
            Some(Arc::from(provider))
        }
        Err(e) => {
            tracing::error!(error = %e, "Provider setup failed, assistant disabled");
            None
        }
    }
}

/// Wire up collaborators and serve until Ctrl-C.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    config.validate()?;

    let access_token = config.line.channel_access_token.as_deref().unwrap_or_default();
    let channel_secret = config.line.channel_secret.as_deref().unwrap_or_default();
    let line = Arc::new(LineClient::new(&config.line.api_base, access_token));

    let own_user_id: Option<Arc<str>> = if config.line.skip_own_messages {
        match line.bot_user_id().await {
            Ok(id) => {
                tracing::info!(bot_user_id = %redact(&id), "Own messages will be skipped");
                Some(Arc::from(id))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch bot user ID, own-message filter off");
                None
            }
        }
    } else {
        None
    };

    let translator: Arc<dyn translate::Translator> =
        Arc::from(translate::create_translator(&config.translation.api_base));
    let router = MessageRouter::new(
        translator,
        build_provider(&config),
        line,
        RouterSettings::from_config(&config),
    );

    let state = AppState {
        router: Arc::new(router),
        channel_secret: Arc::from(channel_secret),
        own_user_id,
    };
    let app = build_router(state, config.gateway.max_body_bytes);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid gateway address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    tracing::info!(address = %local, "Gateway listening, webhook at POST /callback");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
    }
}
