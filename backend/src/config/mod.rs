//! Column configuration for the gradebook transform.
//!
//! Which columns are dropped, which ID columns are removed, which phrases
//! exclude a column, the grading category marker, and the name-indicating
//! terms per language. Defaults cover a typical LMS gradebook export; a JSON
//! file can override any subset of fields.
//!
//! ```json
//! {
//!   "drop_columns": ["Overall"],
//!   "name_terms": { "english": ["name", "learner"] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::models::Language;

/// Environment variable holding a default config file path.
pub const CONFIG_ENV_VAR: &str = "GRADEBOOK_CONFIG";

/// Marker preceding the category inside a graded column name.
pub const DEFAULT_CATEGORY_MARKER: &str = "Grading Category:";

/// Category used when the marker is present but no value follows it.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Cell text blanked out in the final table.
pub const MISSING_TOKEN: &str = "Missing";

/// Fixed configuration of the column transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Columns removed by exact name.
    pub drop_columns: Vec<String>,
    /// Identifier columns removed by exact name.
    pub id_columns: Vec<String>,
    /// Columns containing any of these substrings are removed.
    pub exclusion_phrases: Vec<String>,
    /// Text announcing the grading category in a column name.
    pub category_marker: String,
    pub name_terms: NameTerms,
}

/// Case-insensitive substrings that mark a general column as a name column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameTerms {
    pub english: Vec<String>,
    pub spanish: Vec<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            drop_columns: strings(&["Overall", "Final Grade", "Grading Period", "Last Activity"]),
            id_columns: strings(&[
                "Unique User ID",
                "Student ID",
                "SIS ID",
                "SIS User ID",
                "Section ID",
            ]),
            exclusion_phrases: strings(&["Comments", "Grading Scale", "Letter Grade"]),
            category_marker: DEFAULT_CATEGORY_MARKER.to_string(),
            name_terms: NameTerms::default(),
        }
    }
}

impl Default for NameTerms {
    fn default() -> Self {
        Self {
            english: strings(&["name", "student"]),
            spanish: strings(&["nombre", "apellido", "estudiante", "alumno"]),
        }
    }
}

impl NameTerms {
    pub fn for_language(&self, language: Language) -> &[String] {
        match language {
            Language::English => &self.english,
            Language::Spanish => &self.spanish,
        }
    }
}

impl TransformConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Load from an explicit path, else from `GRADEBOOK_CONFIG`, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => match std::env::var(CONFIG_ENV_VAR) {
                Ok(p) if !p.trim().is_empty() => Self::from_file(p.trim()),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_marker() {
        let config = TransformConfig::default();
        assert_eq!(config.category_marker, "Grading Category:");
        assert!(config.id_columns.contains(&"Unique User ID".to_string()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TransformConfig::from_json(r#"{ "drop_columns": ["Total"] }"#).unwrap();
        assert_eq!(config.drop_columns, vec!["Total"]);
        assert_eq!(config.category_marker, DEFAULT_CATEGORY_MARKER);
        assert_eq!(config.name_terms, NameTerms::default());
    }

    #[test]
    fn test_partial_name_terms() {
        let config =
            TransformConfig::from_json(r#"{ "name_terms": { "english": ["learner"] } }"#).unwrap();
        assert_eq!(config.name_terms.for_language(Language::English), ["learner".to_string()]);
        assert!(!config.name_terms.for_language(Language::Spanish).is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = TransformConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let config = TransformConfig {
            exclusion_phrases: vec!["Attendance".into()],
            ..TransformConfig::default()
        };
        write!(file, "{}", config.to_json().unwrap()).unwrap();

        let loaded = TransformConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = TransformConfig::from_file("/nonexistent/gradebook.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/gradebook.json"));
    }
}
