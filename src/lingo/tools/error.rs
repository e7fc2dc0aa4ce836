use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads, converts, reconciles, or writes localization tables.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a JSON settings file cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the XML writer.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Raised when a row list is empty or a row cannot be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Raised when a table lacks a column the operation depends on.
    #[error("{table} table is missing required column '{column}'")]
    Schema { table: String, column: String },

    /// Raised when source XML is malformed.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when an input file has an extension no operation accepts.
    #[error("unsupported input file: {0}")]
    UnsupportedInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    pub(crate) fn schema(table: &str, column: &str) -> Self {
        ToolError::Schema {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
