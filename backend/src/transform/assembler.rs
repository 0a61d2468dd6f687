//! Builds the output table from the column plan.
//!
//! Order: name columns, other general columns, then per category group its
//! graded columns (renamed to display names) followed by the average column.

use serde::Serialize;
use std::collections::HashSet;

use super::grouper::{category_averages, CategoryGroup};
use super::prioritizer::PrioritizedColumns;
use crate::config::MISSING_TOKEN;
use crate::error::TransformError;
use crate::models::{CellValue, Language, Table};

/// Transformed gradebook plus the display hints the exporter needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradebookOutput {
    pub table: Table,
    /// Synthetic per-category average columns, in output order.
    pub average_columns: Vec<String>,
    /// Columns recognised as student-name columns, in output order.
    pub name_columns: Vec<String>,
}

impl GradebookOutput {
    pub fn is_average_column(&self, name: &str) -> bool {
        self.average_columns.iter().any(|c| c == name)
    }

    pub fn is_name_column(&self, name: &str) -> bool {
        self.name_columns.iter().any(|c| c == name)
    }
}

/// Name of the average column of a category.
pub fn average_column_name(category: &str, language: Language) -> String {
    format!("{}{}", language.average_prefix(), category)
}

/// Assemble the output table.
///
/// Colliding display or average names get a ` (2)`, ` (3)`… suffix.
/// `"Missing"` cells are blanked after averages are computed.
pub fn assemble(
    input: &Table,
    general: &PrioritizedColumns,
    groups: &[CategoryGroup],
    language: Language,
) -> Result<GradebookOutput, TransformError> {
    let mut used: HashSet<String> = general.ordered.iter().cloned().collect();
    let mut headers: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<CellValue>> = Vec::new();
    let mut average_columns = Vec::with_capacity(groups.len());

    for name in &general.ordered {
        if let Some(index) = input.column_index(name) {
            headers.push(name.clone());
            columns.push(input.column(index).cloned().collect());
        }
    }

    for group in groups {
        for member in &group.members {
            if let Some(index) = input.column_index(&member.name) {
                headers.push(unique_name(&member.display_name, &mut used));
                columns.push(input.column(index).cloned().collect());
            }
        }

        let name = unique_name(&average_column_name(&group.category, language), &mut used);
        let values = category_averages(input, group)
            .into_iter()
            .map(|avg| avg.map(CellValue::Number).unwrap_or(CellValue::Empty))
            .collect();
        headers.push(name.clone());
        columns.push(values);
        average_columns.push(name);
    }

    let rows: Vec<Vec<CellValue>> = (0..input.row_count())
        .map(|r| {
            columns
                .iter()
                .map(|column| blank_missing(&column[r]))
                .collect()
        })
        .collect();

    let name_columns = general
        .name_columns
        .iter()
        .filter(|name| headers.contains(*name))
        .cloned()
        .collect();

    Ok(GradebookOutput {
        table: Table::new(headers, rows)?,
        average_columns,
        name_columns,
    })
}

fn blank_missing(value: &CellValue) -> CellValue {
    if value.is_text(MISSING_TOKEN) {
        CellValue::Empty
    } else {
        value.clone()
    }
}

/// Reserve `base`, or the first free `base (n)` if it is taken.
fn unique_name(base: &str, used: &mut HashSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{} ({})", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
