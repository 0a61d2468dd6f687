//! REST API types: the upload form and the JSON responses.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ServerError;
use crate::export::ExportFormat;
use crate::models::{CellValue, Language, ReportMetadata};
use crate::transform::pipeline::{CsvInfo, GradebookRequest};
use crate::transform::GradebookOutput;

/// Fields collected from a multipart upload.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<Vec<u8>>,
    pub file_name: Option<String>,
    pub metadata: ReportMetadata,
    pub language: Option<String>,
    pub format: Option<String>,
}

impl UploadForm {
    /// Store a text field. Unknown field names are ignored.
    pub fn set_text(&mut self, name: &str, value: String) {
        let value = value.trim().to_string();
        match name {
            "teacher" => self.metadata.teacher = value,
            "subject" => self.metadata.subject = value,
            "grade" => self.metadata.grade = value,
            "term" => self.metadata.term = value,
            "language" => self.language = Some(value),
            "format" => self.format = Some(value),
            _ => {}
        }
    }

    /// Validate the form into the file bytes and a pipeline request.
    pub fn into_request(self) -> Result<(Vec<u8>, GradebookRequest), ServerError> {
        let file = self
            .file
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

        let language = match self.language.as_deref() {
            None | Some("") => Language::default(),
            Some(code) => code
                .parse::<Language>()
                .map_err(|e| ServerError::BadRequest(e.to_string()))?,
        };

        let format = match self.format.as_deref() {
            None | Some("") => ExportFormat::default(),
            Some(f) => f.parse::<ExportFormat>().map_err(ServerError::BadRequest)?,
        };

        Ok((
            file,
            GradebookRequest {
                metadata: self.metadata,
                language,
                format,
            },
        ))
    }
}

/// Download name: the upload's stem with the output extension.
pub fn download_name(file_name: Option<&str>, format: ExportFormat) -> String {
    let stem = file_name
        .and_then(|name| std::path::Path::new(name).file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("gradebook");
    format!("{}_formatted.{}", sanitize_file_name(stem), format.extension())
}

/// Keep header-safe characters only.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Response of `/api/preview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// Unique job identifier
    pub job_id: String,
    /// Always "ready" for a successful preview
    pub status: String,
    pub columns: Vec<String>,
    pub average_columns: Vec<String>,
    pub name_columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub csv_info: CsvMetadata,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<CsvInfo> for CsvMetadata {
    fn from(info: CsvInfo) -> Self {
        CsvMetadata {
            encoding: info.encoding,
            delimiter: info.delimiter.to_string(),
            row_count: info.row_count,
            columns: info.headers,
        }
    }
}

impl PreviewResponse {
    pub fn new(gradebook: GradebookOutput, csv_info: CsvInfo) -> Self {
        PreviewResponse {
            job_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            columns: gradebook.table.headers().to_vec(),
            rows: gradebook.table.rows().to_vec(),
            average_columns: gradebook.average_columns,
            name_columns: gradebook.name_columns,
            csv_info: csv_info.into(),
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}
