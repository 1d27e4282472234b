//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl,
//! including totals, a depth breakdown and the failed pages.

use crate::output::{CrawlReport, OutputResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the summary inside a run's output directory
pub const SUMMARY_FILE_NAME: &str = "crawl_summary.md";

/// Writes the markdown summary into `output_dir`
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `output_dir` - Directory the summary file is created in
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &CrawlReport, output_dir: &Path) -> OutputResult<PathBuf> {
    let path = output_dir.join(SUMMARY_FILE_NAME);
    let markdown = format_markdown_summary(report);

    let mut file = File::create(&path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(path)
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Tidemark Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", report.start_url));
    md.push_str(&format!("- **Started**: {}\n", report.crawl_time));
    md.push_str(&format!("- **Duration**: {}\n", report.duration));
    md.push_str(&format!("- **Output**: {}\n", report.output_directory));
    if let Some(error) = &report.error {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Pages**: {}\n", report.total_pages));
    md.push_str(&format!("- **Successful**: {}\n", report.successful_pages));
    md.push_str(&format!("- **Failed**: {}\n", report.failed_pages));
    md.push_str(&format!("- **Success Rate**: {}\n", report.success_rate));
    md.push_str(&format!(
        "- **Total Content**: {} characters\n",
        report.total_content_length
    ));
    md.push_str(&format!(
        "- **Average Content**: {:.0} characters\n",
        report.average_content_length
    ));
    md.push_str(&format!("- **Internal Links**: {}\n\n", report.total_links));

    let mut by_depth: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for page in &report.pages {
        let entry = by_depth.entry(page.depth()).or_default();
        if page.is_success() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }
    if !by_depth.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Successful | Failed |\n");
        md.push_str("|-------|------------|--------|\n");
        for (depth, (ok, failed)) in &by_depth {
            md.push_str(&format!("| {} | {} | {} |\n", depth, ok, failed));
        }
        md.push('\n');
    }

    let saved: Vec<_> = report.pages.iter().filter(|p| p.is_success()).collect();
    if !saved.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Title | File |\n");
        md.push_str("|-----|-------|------|\n");
        for page in saved {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(page.url()),
                escape_cell(page.title()),
                escape_cell(page.filename().unwrap_or_default())
            ));
        }
        md.push('\n');
    }

    let failed: Vec<_> = report.failed_results().collect();
    if !failed.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Depth | Error |\n");
        md.push_str("|-----|-------|-------|\n");
        for page in failed {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(page.url()),
                page.depth(),
                escape_cell(page.error().unwrap_or_default())
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps table cells on one line and out of the column separators
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
