//! Domain models for the gradebook formatting pipeline.
//!
//! - [`CellValue`] - Untyped cell content (number, text, or empty)
//! - [`Table`] - Ordered named columns with one value per row
//! - [`Language`] - Output language for labels and name detection
//! - [`ReportMetadata`] - The four free-text strings shown above the table
//! - [`ColumnClass`] / [`GradedColumn`] - Classification of input columns

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::TableError;

// =============================================================================
// Cell Values
// =============================================================================

/// A single cell of a gradebook table.
///
/// Serializes untagged: numbers as JSON numbers, text as strings and
/// empty cells as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Type a raw field read from a delimited file.
    ///
    /// Surrounding whitespace is dropped; blank fields become [`CellValue::Empty`]
    /// and finite numbers become [`CellValue::Number`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    /// Numeric coercion used for averaging. Anything that is not a finite
    /// number is treated as missing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Whether this cell holds exactly the given text.
    pub fn is_text(&self, text: &str) -> bool {
        matches!(self, CellValue::Text(s) if s == text)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

// =============================================================================
// Table
// =============================================================================

/// Ordered, named columns holding one value per row.
///
/// Column names are unique and every row is exactly as wide as the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, checking name uniqueness and row widths.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(headers.len());
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(TableError::DuplicateColumn(header.clone()));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(TableError::RowWidth {
                    row: i + 1,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

// =============================================================================
// Language
// =============================================================================

/// Output language. Drives labels, the average prefix and which name-term
/// list is used to spot name columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
}

/// Returned when a language code is not recognised.
#[derive(Debug, Error, PartialEq)]
#[error("Unknown language '{0}' (expected 'en' or 'es')")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "eng" | "english" | "inglés" | "ingles" => Ok(Language::English),
            "es" | "spa" | "spanish" | "español" | "espanol" => Ok(Language::Spanish),
            other => Err(ParseLanguageError(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
        }
    }

    /// Prefix of a category average column name, trailing space included.
    pub fn average_prefix(&self) -> &'static str {
        match self {
            Language::English => "Average ",
            Language::Spanish => "Promedio ",
        }
    }

    /// Labels of the metadata header block: teacher, subject, grade, term, date.
    pub fn header_labels(&self) -> [&'static str; 5] {
        match self {
            Language::English => ["Teacher", "Subject", "Grade", "Term", "Date"],
            Language::Spanish => ["Docente", "Asignatura", "Grado", "Periodo", "Fecha"],
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Language::English => "Gradebook",
            Language::Spanish => "Calificaciones",
        }
    }
}

// =============================================================================
// Report Metadata
// =============================================================================

/// Free-text strings placed in the header block of the exported sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub teacher: String,
    pub subject: String,
    pub grade: String,
    pub term: String,
}

impl ReportMetadata {
    /// Values in header-block order (matches [`Language::header_labels`]).
    pub fn values(&self) -> [&str; 4] {
        [&self.teacher, &self.subject, &self.grade, &self.term]
    }
}

// =============================================================================
// Column Classification
// =============================================================================

/// Why a column was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Exact match in the drop-list.
    Listed,
    /// Contains the given exclusion phrase.
    Phrase(String),
}

/// A column tied to a grading category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedColumn {
    /// Name as it appears in the input.
    pub name: String,
    /// Cleaned name: text before any parenthesis plus the category.
    pub display_name: String,
    pub category: String,
    /// Position in the input table.
    pub index: usize,
}

/// Result of classifying a single input column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnClass {
    Dropped(DropReason),
    RemovedId,
    General,
    Graded(GradedColumn),
}

impl ColumnClass {
    pub fn is_retained(&self) -> bool {
        matches!(self, ColumnClass::General | ColumnClass::Graded(_))
    }

    /// Short label used by the `inspect` command.
    pub fn label(&self) -> String {
        match self {
            ColumnClass::Dropped(DropReason::Listed) => "dropped".to_string(),
            ColumnClass::Dropped(DropReason::Phrase(p)) => format!("dropped (contains '{}')", p),
            ColumnClass::RemovedId => "removed-id".to_string(),
            ColumnClass::General => "general".to_string(),
            ColumnClass::Graded(g) => format!("graded [{}] -> {}", g.category, g.display_name),
        }
    }
}

/// An input column together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedColumn {
    pub index: usize,
    pub name: String,
    pub class: ColumnClass,
}
