//! Error types for loading time logs and writing report workbooks.

use thiserror::Error;

/// Errors raised while reading the input sheet or writing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The input workbook could not be opened or parsed.
    #[error("Failed to open workbook {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: calamine::XlsxError,
    },

    /// The requested sheet is not present in the workbook.
    #[error("Sheet '{sheet}' not found (available: {})", available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    /// One or more required header cells are missing.
    #[error("Sheet '{sheet}' is missing required columns: {}", columns.join(", "))]
    MissingColumns { sheet: String, columns: Vec<String> },

    /// The sheet has no header row at all.
    #[error("Sheet '{0}' is empty")]
    EmptySheet(String),

    /// Writing the output workbook failed.
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Result alias for report operations.
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Errors raised while asking the language model a question.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("No API key configured (set OPENAI_API_KEY or --api-key)")]
    MissingApiKey,

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to the API at {0}")]
    Connect(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("The model returned an empty answer")]
    EmptyAnswer,

    #[error("Failed to send request: {0}")]
    Http(#[from] reqwest::Error),
}
