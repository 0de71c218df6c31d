//! Fuzz target for the delimited-text parser.
//!
//! This fuzzer tests that the parser:
//! 1. Never panics on malformed input
//! 2. Always yields rows as wide as the header
//! 3. Never produces duplicate header names

#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use colmap::Parser;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let text = String::from_utf8_lossy(data);
    if let Ok(table) = Parser::new().parse_str(&text) {
        let width = table.headers.len();
        assert!(table.rows.iter().all(|row| row.len() == width));

        let unique: HashSet<&String> = table.headers.iter().collect();
        assert_eq!(unique.len(), width);
    }
});
