//! Styled XLSX rendering.
//!
//! Layout (0-based rows):
//!
//! ```text
//! 0-4  label | value      teacher, subject, grade, term, date
//! 5    (blank)
//! 6    column headers     grey, bold, bordered; averages light blue
//! 7..  student rows       bordered; numeric averages light blue
//! ```

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use super::ExportOptions;
use crate::error::ExportError;
use crate::models::CellValue;
use crate::transform::GradebookOutput;

/// Row of the column header line.
pub const DATA_HEADER_ROW: u32 = 6;

/// Worksheet column limit.
pub const MAX_COLUMNS: usize = 16_384;

pub const NAME_COLUMN_WIDTH: f64 = 30.0;
pub const AVERAGE_COLUMN_WIDTH: f64 = 14.0;
pub const DEFAULT_COLUMN_WIDTH: f64 = 12.0;

/// Light blue used for average columns.
const AVERAGE_FILL: u32 = 0xADD8E6;
const HEADER_FILL: u32 = 0xD9D9D9;

/// Date stamp format in the header block.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which of the sheet formats a table cell takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellStyle {
    Header,
    AverageHeader,
    Plain,
    AverageValue,
}

fn header_style(is_average: bool) -> CellStyle {
    if is_average {
        CellStyle::AverageHeader
    } else {
        CellStyle::Header
    }
}

/// Numeric averages are filled; empty averages keep the plain border.
fn cell_style(is_average: bool, value: &CellValue) -> CellStyle {
    match value {
        CellValue::Number(_) if is_average => CellStyle::AverageValue,
        _ => CellStyle::Plain,
    }
}

/// Formats shared by every cell of the sheet.
struct SheetStyles {
    label: Format,
    header: Format,
    average_header: Format,
    cell: Format,
    average_value: Format,
}

impl SheetStyles {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_text_wrap()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);

        Self {
            label: Format::new().set_bold(),
            average_header: header.clone().set_background_color(Color::RGB(AVERAGE_FILL)),
            header: header.set_background_color(Color::RGB(HEADER_FILL)),
            cell: Format::new().set_border(FormatBorder::Thin),
            average_value: Format::new()
                .set_border(FormatBorder::Thin)
                .set_background_color(Color::RGB(AVERAGE_FILL))
                .set_num_format("0.00"),
        }
    }

    fn format(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Header => &self.header,
            CellStyle::AverageHeader => &self.average_header,
            CellStyle::Plain => &self.cell,
            CellStyle::AverageValue => &self.average_value,
        }
    }
}

/// Render the gradebook as an XLSX workbook in memory.
pub fn render_xlsx(output: &GradebookOutput, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let column_count = output.table.column_count();
    if column_count > MAX_COLUMNS {
        return Err(ExportError::TooManyColumns(column_count));
    }

    let styles = SheetStyles::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(options.language.sheet_name())?;

    write_header_block(worksheet, options, &styles)?;
    write_table(worksheet, output, &styles)?;
    set_column_widths(worksheet, output)?;

    let frozen_columns = leading_name_columns(output) as u16;
    worksheet.set_freeze_panes(DATA_HEADER_ROW + 1, frozen_columns)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_header_block(
    worksheet: &mut Worksheet,
    options: &ExportOptions,
    styles: &SheetStyles,
) -> Result<(), ExportError> {
    let date = options.date.format(DATE_FORMAT).to_string();
    let [teacher, subject, grade, term] = options.metadata.values();
    let values = [teacher, subject, grade, term, date.as_str()];

    for (row, (label, value)) in options
        .language
        .header_labels()
        .iter()
        .zip(values.iter())
        .enumerate()
    {
        let row = row as u32;
        worksheet.write_string_with_format(row, 0, format!("{}:", label), &styles.label)?;
        worksheet.write_string(row, 1, *value)?;
    }
    Ok(())
}

fn write_table(
    worksheet: &mut Worksheet,
    output: &GradebookOutput,
    styles: &SheetStyles,
) -> Result<(), ExportError> {
    let table = &output.table;
    let averages: Vec<bool> = table
        .headers()
        .iter()
        .map(|h| output.is_average_column(h))
        .collect();

    for (col, name) in table.headers().iter().enumerate() {
        let format = styles.format(header_style(averages[col]));
        worksheet.write_string_with_format(DATA_HEADER_ROW, col as u16, name, format)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let xl_row = DATA_HEADER_ROW + 1 + r as u32;
        for (col, value) in row.iter().enumerate() {
            let xl_col = col as u16;
            let format = styles.format(cell_style(averages[col], value));
            match value {
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(xl_row, xl_col, *n, format)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string_with_format(xl_row, xl_col, s, format)?;
                }
                CellValue::Empty => {
                    worksheet.write_blank(xl_row, xl_col, format)?;
                }
            }
        }
    }
    Ok(())
}

fn set_column_widths(worksheet: &mut Worksheet, output: &GradebookOutput) -> Result<(), ExportError> {
    for (col, name) in output.table.headers().iter().enumerate() {
        worksheet.set_column_width(col as u16, column_width(output, name))?;
    }
    Ok(())
}

/// Display width for a column: wide for names, medium for averages.
pub fn column_width(output: &GradebookOutput, name: &str) -> f64 {
    if output.is_name_column(name) {
        NAME_COLUMN_WIDTH
    } else if output.is_average_column(name) {
        AVERAGE_COLUMN_WIDTH
    } else {
        DEFAULT_COLUMN_WIDTH
    }
}

/// Number of name columns at the very start of the table.
fn leading_name_columns(output: &GradebookOutput) -> usize {
    output
        .table
        .headers()
        .iter()
        .take_while(|h| output.is_name_column(h))
        .count()
}
