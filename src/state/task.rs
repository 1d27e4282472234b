//! Crawl tasks and their results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single URL scheduled for fetching at a given depth
///
/// Identity is the normalized URL alone: two tasks with the same URL are equal
/// regardless of depth or parent, so a set of tasks is deduplicated by URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlTask {
    /// Normalized URL to fetch
    pub url: String,

    /// Link distance from the seed (seed is 0)
    pub depth: u32,

    /// Page this link was discovered on (provenance only)
    pub parent_url: Option<String>,
}

impl CrawlTask {
    /// Creates the depth-0 task for a seed URL
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
            parent_url: None,
        }
    }

    /// Creates a task for a link discovered on `parent`
    pub fn child_of(parent: &CrawlTask, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: parent.depth + 1,
            parent_url: Some(parent.url.clone()),
        }
    }
}

impl PartialEq for CrawlTask {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for CrawlTask {}

impl Hash for CrawlTask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// Outcome of attempting one task
///
/// A result is either a success (no error text) or a failure (error text
/// present). The constructors and the deserializer both enforce that `error`
/// is present exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CrawlResultRecord")]
pub struct CrawlResult {
    url: String,
    title: String,
    content_length: usize,
    links_count: usize,
    success: bool,
    error: Option<String>,
    depth: u32,
    filename: Option<String>,
}

impl CrawlResult {
    /// Builds the result of a fetched and persisted page
    pub fn succeeded(
        task: &CrawlTask,
        title: impl Into<String>,
        content_length: usize,
        links_count: usize,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            url: task.url.clone(),
            title: title.into(),
            content_length,
            links_count,
            success: true,
            error: None,
            depth: task.depth,
            filename: Some(filename.into()),
        }
    }

    /// Builds a failed result carrying the error text
    pub fn failed(task: &CrawlTask, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown error".to_string();
        }

        Self {
            url: task.url.clone(),
            title: String::new(),
            content_length: 0,
            links_count: 0,
            success: false,
            error: Some(error),
            depth: task.depth,
            filename: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Number of internal links the page reported
    pub fn links_count(&self) -> usize {
        self.links_count
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Error text; `Some` exactly when the result is a failure
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Identity of the persisted page, if it was stored
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

/// Wire shape of a [`CrawlResult`], validated on the way in
#[derive(Debug, Deserialize)]
struct CrawlResultRecord {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content_length: usize,
    #[serde(default)]
    links_count: usize,
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    depth: u32,
    #[serde(default)]
    filename: Option<String>,
}

/// Raised when a stored result breaks the success/error pairing
#[derive(Debug)]
pub struct InvalidResultRecord {
    url: String,
}

impl fmt::Display for InvalidResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "result for {} must carry an error exactly when it failed",
            self.url
        )
    }
}

impl TryFrom<CrawlResultRecord> for CrawlResult {
    type Error = InvalidResultRecord;

    fn try_from(record: CrawlResultRecord) -> Result<Self, Self::Error> {
        if record.success == record.error.is_some() {
            return Err(InvalidResultRecord { url: record.url });
        }

        Ok(Self {
            url: record.url,
            title: record.title,
            content_length: record.content_length,
            links_count: record.links_count,
            success: record.success,
            error: record.error,
            depth: record.depth,
            filename: record.filename,
        })
    }
}
