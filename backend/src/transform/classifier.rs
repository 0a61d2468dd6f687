//! Column classification.
//!
//! Each input column is put in exactly one bucket, looking at its name only:
//!
//! 1. exact match in the drop-list → dropped
//! 2. exact match in the ID set → removed-id
//! 3. contains an exclusion phrase → dropped
//! 4. contains the grading category marker → graded
//! 5. anything else → general
//!
//! The first matching rule wins.

use regex::Regex;

use crate::config::{TransformConfig, UNKNOWN_CATEGORY};
use crate::error::TransformError;
use crate::models::{ClassifiedColumn, ColumnClass, DropReason, GradedColumn};

/// Classifies column names against a [`TransformConfig`].
pub struct ColumnClassifier<'a> {
    config: &'a TransformConfig,
    category_pattern: Regex,
}

impl<'a> ColumnClassifier<'a> {
    /// Compile the category pattern for the configured marker.
    ///
    /// The category is the text after the marker up to the next comma or
    /// closing parenthesis.
    pub fn new(config: &'a TransformConfig) -> Result<Self, TransformError> {
        let pattern = format!(r"{}\s*([^,)]+)", regex::escape(&config.category_marker));
        Ok(Self {
            config,
            category_pattern: Regex::new(&pattern)?,
        })
    }

    /// Classify every column of a header row, keeping input order.
    pub fn classify_all(&self, headers: &[String]) -> Vec<ClassifiedColumn> {
        headers
            .iter()
            .enumerate()
            .map(|(index, name)| ClassifiedColumn {
                index,
                name: name.clone(),
                class: self.classify(index, name),
            })
            .collect()
    }

    /// Classify a single column by name.
    pub fn classify(&self, index: usize, name: &str) -> ColumnClass {
        if self.config.drop_columns.iter().any(|c| c == name) {
            return ColumnClass::Dropped(DropReason::Listed);
        }

        if self.config.id_columns.iter().any(|c| c == name) {
            return ColumnClass::RemovedId;
        }

        if let Some(phrase) = self
            .config
            .exclusion_phrases
            .iter()
            .find(|p| !p.is_empty() && name.contains(p.as_str()))
        {
            return ColumnClass::Dropped(DropReason::Phrase(phrase.clone()));
        }

        if !self.config.category_marker.is_empty() && name.contains(&self.config.category_marker) {
            let category = self.extract_category(name);
            return ColumnClass::Graded(GradedColumn {
                name: name.to_string(),
                display_name: display_name(name, &category),
                category,
                index,
            });
        }

        ColumnClass::General
    }

    /// Category following the marker, or `"Unknown"` when nothing usable follows.
    pub fn extract_category(&self, name: &str) -> String {
        self.category_pattern
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY)
            .to_string()
    }
}

/// Text before the first parenthesis, trimmed, followed by the category.
pub fn display_name(name: &str, category: &str) -> String {
    let base = name.split('(').next().unwrap_or(name).trim();
    if base.is_empty() {
        category.to_string()
    } else {
        format!("{} {}", base, category)
    }
}
