use crate::core::assemble::AuditResponse;
use crate::domain::model::RelationshipRecord;
use crate::utils::error::{AuditError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const SUPPORTED_FORMATS: [&str; 3] = ["json", "csv", "tsv"];
const REPORT_STEM: &str = "follow_audit";

#[derive(Debug, Clone)]
pub struct ReportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
struct ReportRow<'a> {
    list: &'static str,
    username: &'a str,
    timestamp: Option<i64>,
    followed_at: Option<String>,
}

impl<'a> ReportRow<'a> {
    fn new(list: &'static str, record: &'a RelationshipRecord) -> Self {
        Self {
            list,
            username: &record.username,
            timestamp: record.timestamp,
            followed_at: record
                .timestamp
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.to_rfc3339()),
        }
    }
}

pub fn render(response: &AuditResponse, formats: &[String]) -> Result<Vec<ReportFile>> {
    let mut files = Vec::with_capacity(formats.len());
    for format in formats {
        let bytes = match format.as_str() {
            "json" => serde_json::to_vec_pretty(response)?,
            "csv" => render_delimited(response, b',')?,
            "tsv" => render_delimited(response, b'\t')?,
            other => {
                return Err(AuditError::InvalidConfigValueError {
                    field: "output_formats".to_string(),
                    value: other.to_string(),
                    reason: format!("Supported formats: {}", SUPPORTED_FORMATS.join(", ")),
                })
            }
        };
        files.push(ReportFile {
            name: format!("{REPORT_STEM}.{format}"),
            bytes,
        });
    }
    Ok(files)
}

fn render_delimited(response: &AuditResponse, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    for record in &response.not_following_back {
        writer.serialize(ReportRow::new("not_following_back", record))?;
    }
    for record in &response.not_followed_by_you {
        writer.serialize(ReportRow::new("not_followed_by_you", record))?;
    }

    // 沒有資料列時 serialize 不會寫出標題列
    if response.not_following_back.is_empty() && response.not_followed_by_you.is_empty() {
        writer.write_record(["list", "username", "timestamp", "followed_at"])?;
    }

    writer
        .into_inner()
        .map_err(|e| AuditError::IoError(std::io::Error::other(e.to_string())))
}

/// 把所有報表打包成單一 ZIP
pub fn bundle(files: &[ReportFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.bytes)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
