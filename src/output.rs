//! Local artifact copies and the append-only CSV outputs.
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

const MISSING_REPOS_HEADER: [&str; 2] = ["API Number", "Status"];
const MISSING_REPO_STATUS: &str = "Repository Not Found";

/// One CSV record per harvested test case. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseRow {
    pub api_number: String,
    pub service_name: String,
    pub consumer_name: String,
    pub tc_no: String,
    pub request_type: String,
    pub uri: String,
    pub content_type: String,
    pub query_params: String,
    pub uri_params: String,
    pub headers: String,
    pub kong_config_id: String,
    pub payload_file_path: String,
    pub expected_http_code: String,
}

/// Write a text file, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Open for append; the flag says whether a header row is still needed.
fn open_append(path: &Path) -> Result<(File, bool)> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let needs_header = fs::metadata(path)
        .map(|meta| meta.len() == 0)
        .unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    Ok((file, needs_header))
}

/// Append one test-case row, writing the header first on a new file.
pub fn append_test_case(path: &Path, row: &TestCaseRow) -> Result<()> {
    let (file, needs_header) = open_append(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer
        .serialize(row)
        .with_context(|| format!("append row to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    tracing::info!(path = %path.display(), api_number = %row.api_number, "csv updated");
    Ok(())
}

/// Record an API number whose repository could not be found.
pub fn log_missing_repo(path: &Path, api_number: &str) -> Result<()> {
    let (file, needs_header) = open_append(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer
            .write_record(MISSING_REPOS_HEADER)
            .with_context(|| format!("write header to {}", path.display()))?;
    }
    writer
        .write_record([api_number, MISSING_REPO_STATUS])
        .with_context(|| format!("append to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    tracing::info!(api_number, "logged missing repository");
    Ok(())
}
