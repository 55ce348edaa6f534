//! CSV serialization of flat record sets for download.

use anyhow::{Context, Result};
use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Serialize headers plus rows to CSV bytes. Quoting and escaping follow
/// standard CSV rules via the writer. Empty rows produce a header-only
/// file; fully empty input produces an empty body, never an error.
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    if headers.is_empty() && rows.is_empty() {
        return Ok(Vec::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !headers.is_empty() {
        writer
            .write_record(headers)
            .context("failed to write CSV header row")?;
    }
    for row in rows {
        writer.write_record(row).context("failed to write CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {}", e.error()))
}

/// Wrap CSV bytes in a download response for `<stem>.csv`
pub fn csv_attachment(stem: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<Response> {
    let body = write_csv(headers, rows)?;
    let disposition = format!("attachment; filename=\"{stem}.csv\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
