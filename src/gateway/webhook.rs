//! Webhook and liveness handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use super::AppState;
use crate::channels::parse_webhook;
use crate::security::{verify_signature, SIGNATURE_HEADER};

/// GET / and GET /health
pub async fn handle_health() -> &'static str {
    "LINE translation bridge is running"
}

/// POST /callback: verify, parse, then handle each text message in order.
///
/// Routing outcomes never change the status code; the platform only needs
/// to know the delivery was accepted.
pub async fn handle_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = verify_signature(&state.channel_secret, &body, signature) {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        return (StatusCode::BAD_REQUEST, "Invalid signature");
    }

    let payload = match parse_webhook(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "Rejecting malformed webhook body");
            return (StatusCode::BAD_REQUEST, "Invalid JSON payload");
        }
    };

    let messages = payload.into_incoming(state.own_user_id.as_deref());
    tracing::debug!(count = messages.len(), "Webhook accepted");

    for message in &messages {
        let outcome = state.router.handle(message).await;
        tracing::debug!(?outcome, "Message handled");
    }

    (StatusCode::OK, "OK")
}
