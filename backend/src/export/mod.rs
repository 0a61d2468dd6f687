//! Output rendering.
//!
//! - [`workbook`] - Styled XLSX with the metadata header block
//! - [`delimited`] - Plain CSV of the cleaned table
//!
//! Both render into memory first; callers write the bytes only once
//! rendering has succeeded.

pub mod delimited;
pub mod workbook;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExportError;
use crate::models::{Language, ReportMetadata};
use crate::transform::GradebookOutput;

pub use delimited::render_csv;
pub use workbook::render_xlsx;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("Unknown format '{}' (expected 'xlsx' or 'csv')", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything the exporter needs besides the table itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub metadata: ReportMetadata,
    pub language: Language,
    /// Date stamp shown in the header block.
    pub date: NaiveDate,
}

impl ExportOptions {
    /// Options stamped with today's local date.
    pub fn today(metadata: ReportMetadata, language: Language) -> Self {
        Self {
            metadata,
            language,
            date: chrono::Local::now().date_naive(),
        }
    }
}

/// Render the output in the requested format.
pub fn render(
    output: &GradebookOutput,
    options: &ExportOptions,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Xlsx => render_xlsx(output, options),
        ExportFormat::Csv => render_csv(output),
    }
}
