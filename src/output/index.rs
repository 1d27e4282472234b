//! JSON index artifact written at the end of a crawl

use crate::output::{CrawlReport, OutputResult};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the index inside a run's output directory
pub const INDEX_FILE_NAME: &str = "crawl_index.json";

/// Writes the full report, including every page result, as pretty JSON
///
/// Returns the path written.
pub fn write_index(report: &CrawlReport, output_dir: &Path) -> OutputResult<PathBuf> {
    let path = output_dir.join(INDEX_FILE_NAME);
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Reads an index written by [`write_index`]
pub fn read_index(path: &Path) -> OutputResult<CrawlReport> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
