//! Webhook signature verification.
//!
//! LINE signs every webhook delivery with HMAC-SHA256 over the raw request
//! body, keyed with the channel secret, and sends the base64 digest in the
//! `X-Line-Signature` header.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing {SIGNATURE_HEADER} header")]
    Missing,
    #[error("signature is not valid base64")]
    Malformed,
    #[error("signature does not match request body")]
    Mismatch,
}

fn keyed_mac(secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(body);
    mac
}

/// Compute the base64 HMAC-SHA256 signature of `body` under `secret`.
pub fn sign(secret: &str, body: &[u8]) -> String {
    STANDARD.encode(keyed_mac(secret, body).finalize().into_bytes())
}

/// Verify `signature` (base64, as sent by the platform) against `body`.
///
/// The digest comparison is constant-time.
pub fn verify_signature(
    secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), SignatureError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::Missing)?;

    let expected = STANDARD
        .decode(signature)
        .map_err(|_| SignatureError::Malformed)?;

    keyed_mac(secret, body)
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}
