#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = lingobridge::channels::parse_webhook(data) {
        for message in body.into_incoming(Some("Ubot")) {
            assert!(!message.text.trim().is_empty());
            assert!(!message.reply_token.is_empty());
        }
    }
});
