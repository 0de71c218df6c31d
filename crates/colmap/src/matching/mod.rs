//! Name normalization and lexical similarity scoring.

mod normalize;
mod similarity;

pub use normalize::normalize;
pub use similarity::{
    score, score_normalized, validate_threshold, LexicalScorer, SignalScore,
    DEFAULT_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD,
};
