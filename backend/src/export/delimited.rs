//! Plain CSV rendering of the cleaned table: no header block, no styling.

use csv::WriterBuilder;

use crate::error::ExportError;
use crate::transform::GradebookOutput;

/// Render the output table as comma-separated text.
pub fn render_csv(output: &GradebookOutput) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(output.table.headers())?;
    for row in output.table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
