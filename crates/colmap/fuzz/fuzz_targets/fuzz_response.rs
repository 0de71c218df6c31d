//! Fuzz target for model answer parsing.
//!
//! Model output is untrusted text; parsing must return pairs or an error,
//! never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use colmap::llm::parse::parse_response;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_response(text);
    }
});
