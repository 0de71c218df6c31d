//! Column names and the target/source schemas built from them.

mod column;
mod table;

pub use column::ColumnName;
pub use table::{Columns, SourceSchema, TargetSchema};
