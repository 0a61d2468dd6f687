//! Gradebook CSV reader with encoding and delimiter auto-detection.
//!
//! Turns raw bytes into a typed [`Table`]. No gradebook-specific logic
//! here: column meaning is decided later by the transform.

use csv::{ReaderBuilder, Trim};
use std::path::Path;

use crate::error::CsvError;
use crate::models::{CellValue, Table};

/// Delimiters considered during auto-detection, in tie-break order.
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed gradebook
    pub table: Table,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A leading byte order mark is
/// removed.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting unquoted occurrences in the header line.
///
/// Gradebook headers often carry commas inside quoted names such as
/// `"Quiz 1 (Grading Category: Homework, max 10)"`, so quoted text is skipped.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for c in first_line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|&d| d == c) {
            counts[i] += 1;
        }
    }

    let mut best = CANDIDATE_DELIMITERS[0];
    let mut best_count = 0;
    for (i, &sep) in CANDIDATE_DELIMITERS.iter().enumerate() {
        if counts[i] > best_count {
            best_count = counts[i];
            best = sep;
        }
    }
    best
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use gradebook::parse_csv;
///
/// let table = parse_csv("Name,Quiz\nAna,9", ',').unwrap();
/// assert_eq!(table.headers(), ["Name", "Quiz"]);
/// ```
pub fn parse_csv(content: &str, delimiter: char) -> Result<Table, CsvError> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.is_empty() {
                format!("Column {}", i + 1)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        // Short rows are padded, extra trailing fields ignored.
        let row: Vec<CellValue> = (0..headers.len())
            .map(|i| record.get(i).map(CellValue::parse).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    Ok(Table::new(headers, rows)?)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, CsvError> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let table = parse_csv(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> Result<ParseResult, CsvError> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

fn delimiter_byte(delimiter: char) -> u8 {
    if delimiter.is_ascii() {
        delimiter as u8
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_csv("Name,Quiz\nAna,9\nLuis,7", ',').unwrap();

        assert_eq!(table.headers(), ["Name", "Quiz"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some(&CellValue::Text("Ana".into())));
        assert_eq!(table.cell(1, 1), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn test_quoted_header_with_comma() {
        let csv = "Name,\"Quiz 1 (Grading Category: Homework, max 10)\"\nAna,8";
        let table = parse_csv(csv, ',').unwrap();

        assert_eq!(table.headers()[1], "Quiz 1 (Grading Category: Homework, max 10)");
        assert_eq!(table.cell(0, 1), Some(&CellValue::Number(8.0)));
    }

    #[test]
    fn test_blank_records_skipped() {
        let table = parse_csv("a,b\n1,2\n\n,\n3,4\n", ',').unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_missing_values_padded() {
        let table = parse_csv("a,b,c\n1,,3\n4", ',').unwrap();

        assert_eq!(table.cell(0, 1), Some(&CellValue::Empty));
        assert_eq!(table.cell(1, 0), Some(&CellValue::Number(4.0)));
        assert_eq!(table.cell(1, 2), Some(&CellValue::Empty));
    }

    #[test]
    fn test_extra_columns_ignored() {
        let table = parse_csv("a;b\n1;2;3;4", ';').unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell(0, 1), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_empty_header_named_by_position() {
        let table = parse_csv("Name,,Quiz\nAna,x,1", ',').unwrap();
        assert_eq!(table.headers(), ["Name", "Column 2", "Quiz"]);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = parse_csv("Name,Name\nAna,Ana", ',').unwrap_err();
        assert!(matches!(err, CsvError::Table(_)));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let content = "Name;\"Quiz (Grading Category: HW, max 10)\";\"Test (Grading Category: Exams, max 5)\"\n";
        assert_eq!(detect_delimiter(content), ';');
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "Nombre;Nota\nAna;9,5\nLuis;7";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.table.row_count(), 2);
        assert_eq!(result.table.headers(), ["Nombre", "Nota"]);
        // Decimal commas are not numbers; they stay text.
        assert_eq!(result.table.cell(0, 1), Some(&CellValue::Text("9,5".into())));
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Name,Quiz\nAna,1");
        let result = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(result.table.headers()[0], "Name");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Matemáticas" in ISO-8859-1
        let bytes: &[u8] = &[0x4D, 0x61, 0x74, 0x65, 0x6D, 0xE1, 0x74, 0x69, 0x63, 0x61, 0x73];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Matemáticas");
    }
}
