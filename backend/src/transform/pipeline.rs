//! High-level pipeline: parse → transform → export.
//!
//! This is the error boundary of the tool. Every step either succeeds or
//! the whole run fails with one [`PipelineError`]; no partial output is
//! produced.
//!
//! # Example
//!
//! ```rust,ignore
//! use gradebook::{process_file, GradebookRequest, TransformConfig};
//! use std::path::Path;
//!
//! let request = GradebookRequest::default();
//! let result = process_file(
//!     Path::new("export.csv"),
//!     Path::new("report.xlsx"),
//!     &request,
//!     &TransformConfig::default(),
//! )?;
//! println!("{} students", result.csv_info.row_count);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::assembler::{assemble, GradebookOutput};
use super::gradebook::{plan_columns, ColumnPlan};
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::config::TransformConfig;
use crate::error::{ExportError, PipelineError};
use crate::export::{self, ExportFormat, ExportOptions};
use crate::models::{ColumnClass, DropReason, Language, ReportMetadata};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};

/// What the user asked for besides the file itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradebookRequest {
    pub metadata: ReportMetadata,
    pub language: Language,
    pub format: ExportFormat,
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Rendered file contents
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    /// Transformed table and display hints
    pub gradebook: GradebookOutput,
    pub csv_info: CsvInfo,
}

/// Run the pipeline on raw uploaded bytes.
pub fn process_bytes(
    bytes: &[u8],
    request: &GradebookRequest,
    config: &TransformConfig,
) -> Result<PipelineOutput, PipelineError> {
    log_info("Reading gradebook...");
    let parsed = parse_bytes_auto(bytes)?;
    process_parsed(parsed, request, config)
}

/// Run the pipeline on a file and write the result to `output_path`.
pub fn process_file(
    input: &Path,
    output_path: &Path,
    request: &GradebookRequest,
    config: &TransformConfig,
) -> Result<PipelineOutput, PipelineError> {
    log_info(format!("Reading gradebook: {}", input.display()));
    let parsed = parse_csv_file_auto(input)?;
    let result = process_parsed(parsed, request, config)?;

    std::fs::write(output_path, &result.bytes).map_err(ExportError::from)?;
    log_success(format!("Written to {}", output_path.display()));
    Ok(result)
}

/// Transform only, without rendering a file. Used by previews.
pub fn transform_bytes(
    bytes: &[u8],
    language: Language,
    config: &TransformConfig,
) -> Result<(GradebookOutput, CsvInfo), PipelineError> {
    let parsed = parse_bytes_auto(bytes)?;
    transform_parsed(&parsed, language, config)
}

fn process_parsed(
    parsed: ParseResult,
    request: &GradebookRequest,
    config: &TransformConfig,
) -> Result<PipelineOutput, PipelineError> {
    let (gradebook, csv_info) = transform_parsed(&parsed, request.language, config)?;

    log_info(format!("Rendering {}...", request.format.extension().to_uppercase()));
    let options = ExportOptions::today(request.metadata.clone(), request.language);
    let bytes = export::render(&gradebook, &options, request.format)?;
    log_success(format!("Rendered {} bytes", bytes.len()));

    Ok(PipelineOutput {
        bytes,
        format: request.format,
        gradebook,
        csv_info,
    })
}

/// Shared by export and preview: classify, group and average.
fn transform_parsed(
    parsed: &ParseResult,
    language: Language,
    config: &TransformConfig,
) -> Result<(GradebookOutput, CsvInfo), PipelineError> {
    let csv_info = describe(parsed);
    log_success(format!("Detected encoding: {}", csv_info.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(csv_info.delimiter)));
    log_success(format!(
        "Read {} students, {} columns",
        csv_info.row_count,
        csv_info.headers.len()
    ));
    if csv_info.row_count == 0 {
        log_warning("No student rows; output will only have headers");
    }

    log_info("Classifying columns...");
    let plan = plan_columns(parsed.table.headers(), config, language)?;
    print_plan(&plan);

    log_info("Computing category averages...");
    let gradebook = assemble(&parsed.table, &plan.general, &plan.groups, language)?;
    log_success(format!(
        "{} columns out, {} category averages",
        gradebook.table.column_count(),
        gradebook.average_columns.len()
    ));

    Ok((gradebook, csv_info))
}

fn describe(parsed: &ParseResult) -> CsvInfo {
    CsvInfo {
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        headers: parsed.table.headers().to_vec(),
        row_count: parsed.table.row_count(),
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

fn print_plan(plan: &ColumnPlan) {
    let removed: Vec<_> = plan.removed_columns().collect();
    if !removed.is_empty() {
        log_warning(format!("{} column(s) removed", removed.len()));
        for column in removed {
            let reason = match &column.class {
                ColumnClass::RemovedId => "identifier".to_string(),
                ColumnClass::Dropped(DropReason::Listed) => "drop-list".to_string(),
                ColumnClass::Dropped(DropReason::Phrase(p)) => format!("contains '{}'", p),
                ColumnClass::General | ColumnClass::Graded(_) => continue,
            };
            log_info_indent(format!("{} ({})", column.name, reason), 1);
        }
    }

    if !plan.general.name_columns.is_empty() {
        log_success(format!("Name columns: {}", plan.general.name_columns.join(", ")));
    }

    if plan.groups.is_empty() {
        log_warning("No grading categories found");
    }
    for group in &plan.groups {
        log_info_indent(
            format!("{}: {} assignment(s)", group.category, group.members.len()),
            1,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    const CSV: &str = "\
Student ID,Name,\"HW 1 (Grading Category: Homework)\",\"HW 2 (Grading Category: Homework)\"
1,Ana,80,90
2,Luis,Missing,70
";

    #[test]
    fn test_default_request() {
        let request = GradebookRequest::default();
        assert_eq!(request.language, Language::English);
        assert_eq!(request.format, ExportFormat::Xlsx);
    }

    #[test]
    fn test_process_bytes_csv() {
        let request = GradebookRequest {
            format: ExportFormat::Csv,
            ..GradebookRequest::default()
        };
        let result = process_bytes(CSV.as_bytes(), &request, &TransformConfig::default()).unwrap();

        let text = String::from_utf8(result.bytes).unwrap();
        assert_eq!(
            text,
            "Name,HW 1 Homework,HW 2 Homework,Average Homework\nAna,80,90,85\nLuis,,70,70\n"
        );
        assert_eq!(result.csv_info.row_count, 2);
        assert_eq!(result.csv_info.delimiter, ',');
    }

    #[test]
    fn test_process_bytes_xlsx_is_zip() {
        let result =
            process_bytes(CSV.as_bytes(), &GradebookRequest::default(), &TransformConfig::default())
                .unwrap();
        assert_eq!(&result.bytes[..2], b"PK");
        assert_eq!(result.gradebook.average_columns, vec!["Average Homework"]);
    }

    #[test]
    fn test_header_only_gradebook_renders() {
        let header = "Student ID,Quiz (Grading Category: HW),First Name\n";
        let request = GradebookRequest {
            format: ExportFormat::Csv,
            ..GradebookRequest::default()
        };
        let result = process_bytes(header.as_bytes(), &request, &TransformConfig::default()).unwrap();

        assert_eq!(result.csv_info.row_count, 0);
        assert_eq!(result.gradebook.table.headers(), ["First Name", "Quiz HW", "Average HW"]);
        assert_eq!(result.gradebook.average_columns, vec!["Average HW"]);
        assert_eq!(result.gradebook.table.row_count(), 0);
        assert_eq!(
            String::from_utf8(result.bytes).unwrap(),
            "First Name,Quiz HW,Average HW\n"
        );

        let xlsx = process_bytes(
            header.as_bytes(),
            &GradebookRequest::default(),
            &TransformConfig::default(),
        )
        .unwrap();
        assert_eq!(&xlsx.bytes[..2], b"PK");
    }

    #[test]
    fn test_preview_matches_export() {
        let request = GradebookRequest {
            language: Language::Spanish,
            ..GradebookRequest::default()
        };
        let config = TransformConfig::default();
        let exported = process_bytes(CSV.as_bytes(), &request, &config).unwrap();
        let (preview, _) = transform_bytes(CSV.as_bytes(), Language::Spanish, &config).unwrap();
        assert_eq!(exported.gradebook, preview);
    }

    #[test]
    fn test_transform_bytes_preview() {
        let (gradebook, info) =
            transform_bytes(CSV.as_bytes(), Language::Spanish, &TransformConfig::default()).unwrap();
        assert_eq!(info.headers.len(), 4);
        assert_eq!(gradebook.average_columns, vec!["Promedio Homework"]);
        assert_eq!(gradebook.table.cell(1, 1), Some(&CellValue::Empty));
    }

    #[test]
    fn test_process_file_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("export.csv");
        let output = dir.path().join("report.xlsx");
        std::fs::write(&input, CSV).unwrap();

        let result = process_file(
            &input,
            &output,
            &GradebookRequest::default(),
            &TransformConfig::default(),
        )
        .unwrap();

        let written = std::fs::read(&output).unwrap();
        assert_eq!(written.len(), result.bytes.len());
    }

    #[test]
    fn test_failed_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.csv");
        let output = dir.path().join("report.xlsx");
        std::fs::write(&input, "").unwrap();

        let result = process_file(
            &input,
            &output,
            &GradebookRequest::default(),
            &TransformConfig::default(),
        );
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
