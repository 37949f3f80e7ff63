//! Message routing: decides how an incoming message is answered and sends
//! the reply.
//!
//! The decision is computed by pure functions in [`decision`]; the
//! [`MessageRouter`] executes it against the translation, completion and reply
//! collaborators.

pub mod compose;
pub mod decision;
#[cfg(test)]
pub(crate) mod fakes;
pub mod router;
pub mod traits;

pub use decision::{guess_language, route_language, route_trigger, TriggerSet};
pub use router::{MessageRouter, RouterSettings};
pub use traits::{HandleOutcome, IncomingMessage, LanguageTag, ReplyPayload, RoutingDecision};
