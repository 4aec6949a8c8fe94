//! Spreadsheet import and export of the published catalog.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::name_rules::check_name;
use crate::domain::temple::{NewTemple, Temple, english_name_key};
use crate::domain::types::{
    DistrictName, Latitude, LocalizedText, Longitude, RegionCode, TempleType,
};
use crate::forms::import_export::{
    ParsedUpload, ParsedUploadRow, TEMPLE_HEADERS, UploadTemplesForm, parse_upload,
};
use crate::repository::{TempleListQuery, TempleReader, TempleWriter};
use crate::services::{ServiceError, ServiceResult, require_admin};

/// Row-level upload error used for UI reporting.
#[derive(Debug, Clone, Serialize)]
pub struct UploadRowError {
    pub row_number: usize,
    pub name: Option<String>,
    pub message: String,
}

/// Aggregated upload outcome report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    pub total_rows: usize,
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<UploadRowError>,
}

impl UploadReport {
    pub fn with_total(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    pub fn push_error(
        &mut self,
        row_number: usize,
        name: Option<String>,
        message: impl Into<String>,
    ) {
        self.skipped += 1;
        self.errors.push(UploadRowError {
            row_number,
            name,
            message: message.into(),
        });
    }
}

/// Deity keywords matched against the lowercase English temple name, in order.
const DEITY_KEYWORDS: &[(&[&str], &str, &str)] = &[
    (
        &["narasimha", "anjaneya", "hanuman"],
        "Lord Narasimha",
        "నరసింహ స్వామి",
    ),
    (
        &["venkateswara", "balaji", "tirupati"],
        "Lord Venkateswara",
        "వేంకటేశ్వర స్వామి",
    ),
    (
        &["shiva", "mallikarjuna", "someswara", "lingeswara"],
        "Lord Shiva",
        "శివుడు",
    ),
    (&["rama", "ramachandraswamy"], "Lord Rama", "శ్రీ రామ"),
    (&["saraswati"], "Goddess Saraswati", "సరస్వతి దేవి"),
    (
        &["durga", "devi", "amma", "bhadrakali", "mahankali"],
        "Goddess Devi",
        "దేవి",
    ),
    (
        &["ganesha", "vinayaka", "ganapathi"],
        "Lord Ganesha",
        "గణేశ స్వామి",
    ),
    (
        &["satyanarayana"],
        "Lord Satyanarayana",
        "సత్యనారాయణ స్వామి",
    ),
    (&["surya", "sun temple"], "Lord Surya", "సూర్య దేవుడు"),
    (&["vishnu", "narayana"], "Lord Vishnu", "విష్ణువు"),
];

/// Rows carrying these markers are unfinished placeholders in seed sheets.
const PLACEHOLDER_MARKERS: [&str; 2] = ["additional temple", "to fill"];

/// Best guess of the presiding deity from a temple's English name.
pub fn deduce_deity(name: &str) -> LocalizedText {
    let name = name.to_lowercase();
    DEITY_KEYWORDS
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| name.contains(k)))
        .map(|(_, english, telugu)| LocalizedText::new(*english, *telugu))
        .unwrap_or_else(|| LocalizedText::new("Divine Deity", "దైవం"))
}

fn parse_optional_coordinate(raw: &str, field: &str) -> Result<f64, String> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .map_err(|_| format!("{field} is not a number: {raw}"))
}

fn row_to_new_temple(row: &ParsedUploadRow) -> Result<NewTemple, String> {
    let name_english = row.get("name_english");
    if name_english.is_empty() {
        return Err("name_english is required".to_string());
    }

    let lowered = name_english.to_lowercase();
    if PLACEHOLDER_MARKERS.iter().any(|m| lowered.contains(m)) {
        return Err("placeholder row".to_string());
    }
    check_name(name_english).map_err(|reason| reason.to_string())?;

    let district = DistrictName::new(row.get("district")).map_err(|e| e.to_string())?;
    let state = RegionCode::try_from(row.get("state")).map_err(|e| e.to_string())?;

    let latitude = parse_optional_coordinate(row.get("latitude"), "latitude")
        .and_then(|v| Latitude::new(v).map_err(|e| e.to_string()))?;
    let longitude = parse_optional_coordinate(row.get("longitude"), "longitude")
        .and_then(|v| Longitude::new(v).map_err(|e| e.to_string()))?;

    let deity = if row.get("deity_english").is_empty() {
        deduce_deity(name_english)
    } else {
        LocalizedText::new(row.get("deity_english"), row.get("deity_telugu"))
    };

    let mut temple = NewTemple::new(
        LocalizedText::new(name_english, row.get("name_telugu")),
        district,
        state,
    );
    temple.deity = deity;
    temple.temple_type = match row.get("temple_type") {
        "" => TempleType::default(),
        raw => TempleType::parse_lenient(raw),
    };
    temple.location.latitude = latitude;
    temple.location.longitude = longitude;
    temple.location.address =
        LocalizedText::new(row.get("address_english"), row.get("address_telugu"));

    Ok(temple)
}

/// Imports spreadsheet rows as published temples.
///
/// Invalid rows and rows whose English name is already taken, in the catalog
/// or earlier in the same file, are reported and skipped.
pub fn import_temples<R>(
    upload: &ParsedUpload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<UploadReport>
where
    R: TempleReader + TempleWriter,
{
    require_admin(user)?;

    let (_, existing) = repo
        .list_temples(TempleListQuery::default())
        .map_err(|e| {
            log::error!("Failed to list temples for import: {e}");
            ServiceError::Internal
        })?;

    let mut known_names = existing
        .iter()
        .map(|t| english_name_key(&t.name.english))
        .collect::<HashSet<_>>();

    let mut report = UploadReport::with_total(upload.rows.len());
    let mut batch = Vec::new();

    for row in &upload.rows {
        let name = Some(row.get("name_english").to_string()).filter(|n| !n.is_empty());
        let temple = match row_to_new_temple(row) {
            Ok(temple) => temple,
            Err(message) => {
                report.push_error(row.row_number, name, message);
                continue;
            }
        };

        if !known_names.insert(english_name_key(&temple.name.english)) {
            report.push_error(row.row_number, name, "temple already exists");
            continue;
        }
        batch.push(temple);
    }

    if !batch.is_empty() {
        report.created = repo.create_temples(&batch).map_err(|e| {
            log::error!("Failed to import temples: {e}");
            ServiceError::Internal
        })?;
    }

    log::info!(
        "Temple import by {}: {} created, {} skipped",
        user.sub,
        report.created,
        report.skipped
    );
    Ok(report)
}

/// Parses a multipart upload and imports its rows.
pub fn upload_temples<R>(
    form: &mut UploadTemplesForm,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<UploadReport>
where
    R: TempleReader + TempleWriter,
{
    require_admin(user)?;
    let upload = parse_upload(form)?;
    import_temples(&upload, user, repo)
}

fn temple_row(temple: &Temple) -> Vec<String> {
    vec![
        temple.name.english.clone(),
        temple.name.telugu.clone(),
        temple.deity.english.clone(),
        temple.deity.telugu.clone(),
        temple.district.to_string(),
        temple.state.as_str().to_string(),
        temple.temple_type.as_str().to_string(),
        temple.location.address.english.clone(),
        temple.location.address.telugu.clone(),
        temple.location.latitude.get().to_string(),
        temple.location.longitude.get().to_string(),
    ]
}

/// Renders the whole catalog with the import header set.
pub fn export_temples<R>(
    format: DownloadFormat,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<DownloadFile>
where
    R: TempleReader,
{
    require_admin(user)?;

    let (_, temples) = repo
        .list_temples(TempleListQuery::default())
        .map_err(|e| {
            log::error!("Failed to list temples for export: {e}");
            ServiceError::Internal
        })?;

    let rows = temples.iter().map(temple_row).collect::<Vec<_>>();
    render_download_file("temples", format, &TEMPLE_HEADERS, &rows).map_err(|e| {
        log::error!("Failed to render temple export: {e}");
        ServiceError::Internal
    })
}

/// Export entry point taking the raw `format` query value.
pub fn download_temples<R>(
    format: &str,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<DownloadFile>
where
    R: TempleReader,
{
    let format = DownloadFormat::try_from(format).map_err(|e| ServiceError::Form(e.to_string()))?;
    export_temples(format, user, repo)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for DownloadFormat {
    type Error = DownloadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(DownloadError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download format: {0}")]
    InvalidFormat(String),
    #[error("failed to render csv")]
    CsvRender,
    #[error("failed to render xlsx")]
    XlsxRender,
}

pub fn render_download_file(
    base_name: &str,
    format: DownloadFormat,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<DownloadFile, DownloadError> {
    match format {
        DownloadFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer
                .write_record(headers)
                .map_err(|_| DownloadError::CsvRender)?;
            for row in rows {
                let escaped_row: Vec<String> =
                    row.iter().map(|value| escape_csv_cell(value)).collect();
                writer
                    .write_record(&escaped_row)
                    .map_err(|_| DownloadError::CsvRender)?;
            }
            let bytes = writer.into_inner().map_err(|_| DownloadError::CsvRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.csv"),
                content_type: "text/csv; charset=utf-8",
                bytes,
            })
        }
        DownloadFormat::Xlsx => {
            let mut workbook = rust_xlsxwriter::Workbook::new();
            let worksheet = workbook.add_worksheet();

            for (col_idx, header) in headers.iter().enumerate() {
                worksheet
                    .write_string(0, col_idx as u16, *header)
                    .map_err(|_| DownloadError::XlsxRender)?;
            }

            for (row_idx, row) in rows.iter().enumerate() {
                let sheet_row = (row_idx + 1) as u32;
                for (col_idx, value) in row.iter().enumerate() {
                    worksheet
                        .write_string(sheet_row, col_idx as u16, value)
                        .map_err(|_| DownloadError::XlsxRender)?;
                }
            }

            let bytes = workbook
                .save_to_buffer()
                .map_err(|_| DownloadError::XlsxRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.xlsx"),
                content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            })
        }
    }
}

fn escape_csv_cell(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some('=' | '+' | '-' | '@') => format!("'{value}"),
        _ => value.to_string(),
    }
}
