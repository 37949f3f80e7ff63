#![no_main]
use libfuzzer_sys::fuzz_target;
use lingobridge::security::{sign, verify_signature};

fuzz_target!(|data: &[u8]| {
    let (header, body) = data.split_at(data.len() / 2);
    if let Ok(header) = std::str::from_utf8(header) {
        let _ = verify_signature("fuzz-secret", body, Some(header));
    }
    let signature = sign("fuzz-secret", body);
    assert!(verify_signature("fuzz-secret", body, Some(&signature)).is_ok());
});
