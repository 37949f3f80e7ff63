pub mod schema;

#[allow(unused_imports)]
pub use schema::{AssistantConfig, Config, GatewayConfig, LineConfig, TranslationConfig};
