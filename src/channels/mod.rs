//! Messaging platform adapters.

pub mod line;
pub mod traits;

pub use line::{parse_webhook, LineClient, WebhookBody};
pub use traits::{ReplyMessage, ReplySender};
