//! Security helpers: webhook signature verification and secret redaction.
//!
//! [`verify_signature`] guards the inbound webhook; [`redact`] is the only way
//! credentials and reply tokens should reach the logs.

pub mod signature;

pub use signature::{sign, verify_signature, SignatureError, SIGNATURE_HEADER};

/// Redact sensitive values for safe logging. Shows first 4 chars + "***" suffix.
pub fn redact(value: &str) -> String {
    if value.chars().count() <= 4 {
        "***".to_string()
    } else {
        let prefix: String = value.chars().take(4).collect();
        format!("{prefix}***")
    }
}
