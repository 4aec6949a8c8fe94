use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek, SeekFrom};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;

/// Column set of the temple seed sheet.
pub const TEMPLE_HEADERS: [&str; 11] = [
    "name_english",
    "name_telugu",
    "deity_english",
    "deity_telugu",
    "district",
    "state",
    "temple_type",
    "address_english",
    "address_telugu",
    "latitude",
    "longitude",
];

/// Columns every upload must carry.
pub const REQUIRED_HEADERS: [&str; 3] = ["name_english", "district", "state"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for UploadFormat {
    type Error = UploadParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(UploadParseError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(MultipartForm)]
pub struct UploadTemplesForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
    pub format: Text<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUploadRow {
    /// One-based sheet row, counting the header.
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

impl ParsedUploadRow {
    /// Trimmed cell value, empty when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUpload {
    pub format: UploadFormat,
    pub headers: Vec<String>,
    pub rows: Vec<ParsedUploadRow>,
}

#[derive(Debug, Error)]
pub enum UploadParseError {
    #[error("invalid upload format: {0}")]
    InvalidFormat(String),
    #[error("uploaded file is missing")]
    MissingFile,
    #[error("uploaded file extension does not match selected format")]
    ExtensionMismatch,
    #[error("uploaded file content type does not match selected format")]
    ContentTypeMismatch,
    #[error("failed to read uploaded file")]
    ReadFailed,
    #[error("failed to parse CSV")]
    CsvParseFailed,
    #[error("failed to parse XLSX")]
    XlsxParseFailed,
    #[error("uploaded file has no worksheet")]
    XlsxMissingSheet,
    #[error("header validation failed: {0}")]
    HeaderValidation(String),
}

impl From<std::io::Error> for UploadParseError {
    fn from(_: std::io::Error) -> Self {
        Self::ReadFailed
    }
}

impl From<csv::Error> for UploadParseError {
    fn from(_: csv::Error) -> Self {
        Self::CsvParseFailed
    }
}

impl From<calamine::Error> for UploadParseError {
    fn from(_: calamine::Error) -> Self {
        Self::XlsxParseFailed
    }
}

pub fn parse_upload(form: &mut UploadTemplesForm) -> Result<ParsedUpload, UploadParseError> {
    let format = UploadFormat::try_from(form.format.as_str())?;

    validate_file_meta(form, format)?;

    let (headers, rows) = match format {
        UploadFormat::Csv => parse_csv_rows(form)?,
        UploadFormat::Xlsx => parse_xlsx_rows(form)?,
    };

    let headers = normalize_headers(headers)?;
    validate_headers(&headers)?;

    Ok(ParsedUpload {
        format,
        rows: rows_to_records(&headers, rows),
        headers,
    })
}

/// Parses CSV text already in memory, e.g. the bundled seed sheet.
pub fn parse_csv_text(content: &str) -> Result<ParsedUpload, UploadParseError> {
    let (headers, rows) = read_csv(content)?;
    let headers = normalize_headers(headers)?;
    validate_headers(&headers)?;

    Ok(ParsedUpload {
        format: UploadFormat::Csv,
        rows: rows_to_records(&headers, rows),
        headers,
    })
}

fn rows_to_records(headers: &[String], rows: Vec<Vec<String>>) -> Vec<ParsedUploadRow> {
    rows.into_iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(idx, row)| {
            let values = headers
                .iter()
                .enumerate()
                .map(|(col_idx, header)| {
                    let value = row.get(col_idx).map_or("", |v| v.trim());
                    (header.clone(), value.to_string())
                })
                .collect();
            ParsedUploadRow {
                row_number: idx + 2,
                values,
            }
        })
        .collect()
}

fn normalize_headers(headers: Vec<String>) -> Result<Vec<String>, UploadParseError> {
    let normalized = headers
        .into_iter()
        .map(|header| header.trim().to_ascii_lowercase())
        .collect::<Vec<_>>();

    if normalized.is_empty() {
        return Err(UploadParseError::HeaderValidation(
            "missing header row".to_string(),
        ));
    }

    if normalized.iter().any(|header| header.is_empty()) {
        return Err(UploadParseError::HeaderValidation(
            "header contains empty column name".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for header in &normalized {
        if !seen.insert(header.clone()) {
            return Err(UploadParseError::HeaderValidation(format!(
                "duplicate header column: {header}"
            )));
        }
    }

    Ok(normalized)
}

fn validate_headers(headers: &[String]) -> Result<(), UploadParseError> {
    let header_set = headers.iter().map(String::as_str).collect::<HashSet<_>>();

    for required in REQUIRED_HEADERS {
        if !header_set.contains(required) {
            return Err(UploadParseError::HeaderValidation(format!(
                "missing required column: {required}"
            )));
        }
    }

    for header in headers {
        if !TEMPLE_HEADERS.contains(&header.as_str()) {
            return Err(UploadParseError::HeaderValidation(format!(
                "unsupported column: {header}"
            )));
        }
    }

    Ok(())
}

fn validate_file_meta(
    form: &UploadTemplesForm,
    format: UploadFormat,
) -> Result<(), UploadParseError> {
    let Some(file_name) = form.file.file_name.as_ref() else {
        return Err(UploadParseError::MissingFile);
    };

    let extension_ok = match format {
        UploadFormat::Csv => file_name.to_ascii_lowercase().ends_with(".csv"),
        UploadFormat::Xlsx => file_name.to_ascii_lowercase().ends_with(".xlsx"),
    };

    if !extension_ok {
        return Err(UploadParseError::ExtensionMismatch);
    }

    if let Some(content_type) = form.file.content_type.as_ref() {
        let mime = content_type.essence_str();
        let content_type_ok = match format {
            UploadFormat::Csv => matches!(
                mime,
                "text/csv" | "application/csv" | "application/vnd.ms-excel" | "text/plain"
            ),
            UploadFormat::Xlsx => {
                mime == "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        };

        if !content_type_ok {
            return Err(UploadParseError::ContentTypeMismatch);
        }
    }

    Ok(())
}

type RawRows = (Vec<String>, Vec<Vec<String>>);

fn read_csv(content: &str) -> Result<RawRows, UploadParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::None)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok((headers, rows))
}

fn parse_csv_rows(form: &mut UploadTemplesForm) -> Result<RawRows, UploadParseError> {
    let file = form.file.file.as_file_mut();
    file.seek(SeekFrom::Start(0))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    read_csv(&content)
}

fn parse_xlsx_rows(form: &mut UploadTemplesForm) -> Result<RawRows, UploadParseError> {
    let path = form.file.file.path().to_path_buf();
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(UploadParseError::XlsxMissingSheet)??;

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return Err(UploadParseError::HeaderValidation(
            "missing header row".to_string(),
        ));
    };

    let headers = header_row.iter().map(cell_to_string).collect::<Vec<_>>();

    let mut rows = Vec::new();
    for row in iter {
        rows.push(row.iter().map(cell_to_string).collect::<Vec<_>>());
    }

    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell.to_string(),
    }
}
