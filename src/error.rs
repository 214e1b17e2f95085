use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads attendance workbooks, derives tables, or writes them back.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the run manifest cannot be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when one or more required columns are absent from a sheet.
    #[error("sheet '{sheet}' is missing columns: {}", .columns.join(", "))]
    MissingColumn { sheet: String, columns: Vec<String> },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the path exists but is not a regular file.
    #[error("input path is not a file: {0}")]
    InvalidPath(PathBuf),

    /// Raised when a sheet is addressed by a position the workbook does not have.
    #[error("sheet index {index} is out of range for a workbook with {len} sheets")]
    SheetIndexOutOfRange { index: usize, len: usize },

    /// Raised when a person's hours total is zero and a share cannot be prorated.
    #[error("cannot prorate for '{name}': total work hours is zero")]
    DivisionByZero { name: String },

    /// Raised when a cell that must hold a number holds something else.
    #[error("invalid value '{value}' in column {column}")]
    Parse { column: String, value: String },

    /// Raised when work days cannot be distributed over a person's projects.
    #[error("cannot allocate work days: {0}")]
    Allocation(String),

    /// Raised by a stage when one of its sheets fails; carries the sheet name.
    #[error("{stage} failed on sheet '{sheet}': {source}")]
    Stage {
        stage: &'static str,
        sheet: String,
        #[source]
        source: Box<ToolError>,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
