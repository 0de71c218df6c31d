//! Conversion of source data into the target layout.

mod projector;
mod writer;

pub use projector::{ConversionResult, project};
pub use writer::OutputFormat;
