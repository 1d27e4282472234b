//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Reducing completed results into a crawl report
//! - Writing the JSON index of a run
//! - Generating markdown summaries of crawl results

mod index;
mod markdown;
pub mod stats;

pub use index::{read_index, write_index, INDEX_FILE_NAME};
pub use markdown::{format_markdown_summary, generate_markdown_summary, SUMMARY_FILE_NAME};
pub use stats::{print_report, print_single_report, success_rate, CrawlReport, SinglePageReport};

use thiserror::Error;

/// Errors that can occur while writing output artifacts
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes the index and the markdown summary for a finished crawl
///
/// Failures are logged and otherwise ignored: the report itself is the
/// authoritative result of the run.
pub fn write_artifacts(report: &CrawlReport, output_dir: &std::path::Path) {
    match write_index(report, output_dir) {
        Ok(path) => tracing::info!("Index written to {}", path.display()),
        Err(e) => tracing::error!("Failed to write crawl index: {}", e),
    }

    match generate_markdown_summary(report, output_dir) {
        Ok(path) => tracing::debug!("Summary written to {}", path.display()),
        Err(e) => tracing::error!("Failed to write crawl summary: {}", e),
    }
}
