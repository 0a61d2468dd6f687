//! Error types for the gradebook formatting pipeline.
//!
//! - [`TableError`] - Malformed in-memory tables
//! - [`CsvError`] - Reading and decoding delimited input
//! - [`ConfigError`] - Loading the column configuration
//! - [`TransformError`] - Column classification and grouping
//! - [`ExportError`] - Writing the spreadsheet
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP surface errors
//!
//! Every layer converts into the one above through `From`, so `?` carries
//! a failure up to the boundary where it is shown as a single message.

use thiserror::Error;

// =============================================================================
// Table Errors
// =============================================================================

/// Errors raised while building a [`crate::models::Table`].
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    /// Two columns share the same name.
    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    /// A row does not have one value per column.
    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Parsed data does not form a valid table.
    #[error("Invalid gradebook table: {0}")]
    Table(#[from] TableError),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => CsvError::IoError(io),
            _ => CsvError::ParseError { line, message },
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading a [`crate::config::TransformConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors during column classification and grouping.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The grading category marker could not be turned into a pattern.
    #[error("Invalid grading category pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The assembled table violates table invariants.
    #[error("Assembled table is invalid: {0}")]
    Table(#[from] TableError),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while rendering the output spreadsheet.
#[derive(Debug, Error)]
pub enum ExportError {
    /// XLSX writer failure.
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSV writer failure.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the rendered bytes failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// More columns than a worksheet can hold.
    #[error("Too many columns for a worksheet: {0}")]
    TooManyColumns(usize),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// Returned by [`crate::transform::pipeline::process_bytes`] and friends.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl PipelineError {
    /// Whether the failure was caused by the submitted data rather than the
    /// tool itself.
    pub fn is_input_error(&self) -> bool {
        matches!(self, PipelineError::Csv(_) | PipelineError::Config(_))
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // TableError -> CsvError -> PipelineError
        let table_err = TableError::DuplicateColumn("Quiz 1".into());
        let csv_err: CsvError = table_err.into();
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("Quiz 1"));
        assert!(pipeline_err.is_input_error());

        let export_err = ExportError::TooManyColumns(20_000);
        let pipeline_err: PipelineError = export_err.into();
        assert!(pipeline_err.to_string().contains("20000"));
        assert!(!pipeline_err.is_input_error());
    }

    #[test]
    fn test_row_width_format() {
        let err = TableError::RowWidth {
            row: 3,
            expected: 5,
            found: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("expected 5"));
    }

    #[test]
    fn test_server_error_shows_pipeline_message() {
        let err: ServerError = PipelineError::Csv(CsvError::EmptyFile).into();
        assert_eq!(err.to_string(), "CSV error: CSV file is empty");
    }
}
