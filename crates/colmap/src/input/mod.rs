//! Input parsing and data source handling.

mod parser;
mod source;
mod workbook;

pub use parser::{content_hash, Parser, ParserConfig};
pub use source::{DataTable, SourceMetadata};
