//! Fuzz target for header normalization and scoring.
//!
//! This fuzzer tests that:
//! 1. Normalizing never panics on unbalanced or nested brackets
//! 2. Normalization is a fixpoint
//! 3. Scores stay symmetric and within 0-100

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use colmap::{normalize, score};

#[derive(Arbitrary, Debug)]
struct Headers {
    left: String,
    right: String,
}

fuzz_target!(|input: Headers| {
    if input.left.len() > 1_000 || input.right.len() > 1_000 {
        return;
    }

    let once = normalize(&input.left);
    assert_eq!(normalize(&once), once);

    let ab = score(&input.left, &input.right);
    assert!(ab <= 100);
    assert_eq!(ab, score(&input.right, &input.left));
});
