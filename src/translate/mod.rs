//! Translation collaborator: language detection and machine translation.

pub mod google;
pub mod traits;

pub use google::GoogleTranslator;
pub use traits::{TranslateError, Translator};

/// Create the default translator against `base_url`.
pub fn create_translator(base_url: &str) -> Box<dyn Translator> {
    Box::new(GoogleTranslator::new(base_url))
}
