//! Error types for the colmap library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for colmap operations.
#[derive(Debug, Error)]
pub enum ColmapError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading a spreadsheet workbook.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Error writing an xlsx file.
    #[error("Xlsx write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no header row.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The inference backend could not be reached, timed out, or refused the request.
    #[error("AI backend unreachable: {0}")]
    BackendUnreachable(String),

    /// The inference backend answered with text that could not be parsed.
    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    /// An override named a source column that is not in the source schema.
    #[error("Unknown source column '{0}'")]
    UnknownSourceColumn(String),

    /// An override named a target column that is not in the target schema.
    #[error("Unknown target column '{0}'")]
    UnknownTargetColumn(String),

    /// An operation needs a schema (or mapping) that has not been loaded yet.
    #[error("{0} not loaded")]
    SchemaMissing(String),

    /// A schema contains the same column twice.
    #[error("Duplicate column '{column}' in {schema} schema")]
    DuplicateColumn { schema: String, column: String },

    /// A mapping table does not satisfy its invariants against the schemas.
    #[error("Inconsistent mapping: {0}")]
    InconsistentMapping(String),

    /// The source file changed since the session was saved.
    #[error("Stale session: {0}")]
    StaleSession(String),

    /// Error reading or writing a session file.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ColmapError {
    /// Whether the error comes from the AI boundary and should degrade
    /// to lexical-only matching instead of stopping the pipeline.
    pub fn is_recoverable_ai_failure(&self) -> bool {
        matches!(
            self,
            ColmapError::BackendUnreachable(_) | ColmapError::MalformedResponse(_)
        )
    }
}

/// Result type alias for colmap operations.
pub type Result<T> = std::result::Result<T, ColmapError>;
