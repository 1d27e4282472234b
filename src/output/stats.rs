//! Statistics aggregation over completed crawl results
//!
//! This module reduces the completed results of a run into the report that
//! is returned to callers, written to the index, and printed by the CLI.

use crate::state::CrawlResult;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format of the human-readable crawl start time
pub const CRAWL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Summary of one website crawl
///
/// A failed run (one that could not start or broke at the top level) has the
/// same shape with `success = false`, `error` set and zero counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub start_url: String,

    /// Crawl start in local time, `%Y-%m-%d %H:%M:%S`
    #[serde(default)]
    pub crawl_time: String,

    /// Human-readable duration, e.g. `12.34s`
    #[serde(default)]
    pub duration: String,

    pub total_pages: usize,
    pub successful_pages: usize,
    pub failed_pages: usize,

    /// Percentage with one decimal, or `0%` when nothing completed
    #[serde(default)]
    pub success_rate: String,

    /// Sum of content lengths over successful pages
    #[serde(default)]
    pub total_content_length: usize,

    /// Sum of discovered internal links over successful pages
    #[serde(default)]
    pub total_links: usize,

    /// Mean content length over successful pages; 0 when there are none
    #[serde(default)]
    pub average_content_length: f64,

    /// Wall-clock seconds from crawl start to end
    pub total_duration: f64,

    #[serde(default)]
    pub output_directory: String,

    pub pages: Vec<CrawlResult>,
}

impl CrawlReport {
    /// Reduces completed results into a report
    ///
    /// # Arguments
    ///
    /// * `start_url` - The seed URL of the crawl
    /// * `start_time` - When the crawl (including resumed runs) began
    /// * `end_time` - When the crawl finished
    /// * `output_dir` - Where pages and artifacts were written
    /// * `completed` - Every completed result, in completion order
    pub fn aggregate(
        start_url: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        output_dir: &Path,
        completed: &[CrawlResult],
    ) -> Self {
        let successes: Vec<&CrawlResult> = completed.iter().filter(|r| r.is_success()).collect();
        let successful_pages = successes.len();
        let total_pages = completed.len();

        let total_content_length: usize = successes.iter().map(|r| r.content_length()).sum();
        let total_links: usize = successes.iter().map(|r| r.links_count()).sum();
        let average_content_length = if successful_pages > 0 {
            total_content_length as f64 / successful_pages as f64
        } else {
            0.0
        };

        let total_duration = seconds_between(start_time, end_time);

        Self {
            success: true,
            error: None,
            start_url: start_url.to_string(),
            crawl_time: format_crawl_time(start_time),
            duration: format!("{:.2}s", total_duration),
            total_pages,
            successful_pages,
            failed_pages: total_pages - successful_pages,
            success_rate: success_rate(successful_pages, total_pages),
            total_content_length,
            total_links,
            average_content_length,
            total_duration,
            output_directory: output_dir.display().to_string(),
            pages: completed.to_vec(),
        }
    }

    /// Builds the report for a crawl that failed at the top level
    pub fn failure(start_url: &str, error: impl Into<String>, output_dir: Option<&Path>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            start_url: start_url.to_string(),
            crawl_time: format_crawl_time(Utc::now()),
            duration: "0.00s".to_string(),
            total_pages: 0,
            successful_pages: 0,
            failed_pages: 0,
            success_rate: success_rate(0, 0),
            total_content_length: 0,
            total_links: 0,
            average_content_length: 0.0,
            total_duration: 0.0,
            output_directory: output_dir
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            pages: Vec::new(),
        }
    }

    /// Results that failed, in completion order
    pub fn failed_results(&self) -> impl Iterator<Item = &CrawlResult> {
        self.pages.iter().filter(|r| !r.is_success())
    }
}

/// Outcome of a single-page crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinglePageReport {
    pub success: bool,
    pub url: String,
    pub title: String,
    pub content_length: usize,
    pub links_count: usize,
    pub filename: Option<String>,
    pub output_directory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SinglePageReport {
    pub fn from_result(result: &CrawlResult, output_dir: &Path) -> Self {
        Self {
            success: result.is_success(),
            url: result.url().to_string(),
            title: result.title().to_string(),
            content_length: result.content_length(),
            links_count: result.links_count(),
            filename: result.filename().map(str::to_string),
            output_directory: output_dir.display().to_string(),
            error: result.error().map(str::to_string),
        }
    }

    pub fn failure(url: &str, error: impl Into<String>, output_dir: Option<&Path>) -> Self {
        Self {
            success: false,
            url: url.to_string(),
            title: String::new(),
            content_length: 0,
            links_count: 0,
            filename: None,
            output_directory: output_dir
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            error: Some(error.into()),
        }
    }
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds().max(0);
    millis as f64 / 1000.0
}

fn format_crawl_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(CRAWL_TIME_FORMAT).to_string()
}

/// Formats `successes / total` as a percentage string
pub fn success_rate(successes: usize, total: usize) -> String {
    if total == 0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", successes as f64 / total as f64 * 100.0)
    }
}

/// Prints a crawl report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    if let Some(error) = &report.error {
        println!("Crawl failed: {}", error);
        println!("  Start URL: {}", report.start_url);
        return;
    }

    println!("Overview:");
    println!("  Start URL: {}", report.start_url);
    println!("  Started: {}", report.crawl_time);
    println!("  Duration: {}", report.duration);
    println!("  Output: {}", report.output_directory);
    println!();

    println!("Pages:");
    println!("  Total: {}", report.total_pages);
    println!("  Successful: {}", report.successful_pages);
    println!("  Failed: {}", report.failed_pages);
    println!("  Success rate: {}", report.success_rate);
    println!();

    println!("Content:");
    println!("  Total characters: {}", report.total_content_length);
    println!(
        "  Average characters per page: {:.0}",
        report.average_content_length
    );
    println!("  Internal links found: {}", report.total_links);

    let failed: Vec<&CrawlResult> = report.failed_results().collect();
    if !failed.is_empty() {
        println!();
        println!("Failures:");
        for result in failed {
            println!("  {}: {}", result.url(), result.error().unwrap_or_default());
        }
    }
}

/// Prints a single-page report to stdout
pub fn print_single_report(report: &SinglePageReport) {
    if report.success {
        println!("Crawled {}", report.url);
        println!("  Title: {}", report.title);
        println!("  Characters: {}", report.content_length);
        println!("  Internal links: {}", report.links_count);
        if let Some(filename) = &report.filename {
            println!("  Saved: {}/{}", report.output_directory, filename);
        }
    } else {
        println!(
            "Failed to crawl {}: {}",
            report.url,
            report.error.as_deref().unwrap_or_default()
        );
    }
}
