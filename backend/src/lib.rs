//! # Gradebook - LMS gradebook export to a printable report
//!
//! Turns the raw CSV gradebook exported by a learning management system into
//! a clean table: administrative columns removed, name columns first,
//! assignments grouped by grading category, and one average column per
//! category. The result is rendered as a styled XLSX workbook (or plain CSV).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform   │────▶│   Export    │
//! │ (UTF8/1252) │     │  (auto-enc) │     │ (classify +  │     │ (XLSX/CSV)  │
//! └─────────────┘     └─────────────┘     │  average)    │     └─────────────┘
//!                                         └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gradebook::{process_file, GradebookRequest, TransformConfig};
//! use std::path::Path;
//!
//! let result = process_file(
//!     Path::new("export.csv"),
//!     Path::new("export.xlsx"),
//!     &GradebookRequest::default(),
//!     &TransformConfig::default(),
//! )
//! .unwrap();
//! println!("{} category averages", result.gradebook.average_columns.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (Table, CellValue, Language, ColumnClass)
//! - [`config`] - Column rules, loaded from JSON
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Classification, grouping, averaging, and pipeline
//! - [`export`] - XLSX and CSV rendering
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;
pub mod config;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    CsvError,
    ExportError,
    PipelineError,
    ServerError,
    TableError,
    TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CellValue,
    ClassifiedColumn,
    ColumnClass,
    DropReason,
    GradedColumn,
    Language,
    ReportMetadata,
    Table,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{NameTerms, TransformConfig};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_csv,
    parse_csv_file_auto,
    ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    assemble,
    category_averages,
    group_by_category,
    mean_skip_missing,
    plan_columns,
    prioritize_name_columns,
    transform_gradebook,
    CategoryGroup,
    ColumnClassifier,
    ColumnPlan,
    GradebookOutput,
    PrioritizedColumns,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    process_bytes,
    process_file,
    transform_bytes,
    CsvInfo,
    GradebookRequest,
    PipelineOutput,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{render, render_csv, render_xlsx, ExportFormat, ExportOptions};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CsvMetadata, PreviewResponse, UploadForm};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
