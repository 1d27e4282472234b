//! Storage traits and error types
//!
//! This module defines the storage port the traversal engine persists pages
//! through, and the associated error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot derive a storage identity from URL: {0}")]
    InvalidUrl(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Page facts written alongside the content
#[derive(Debug, Clone)]
pub struct PageMetadata {
    pub title: String,
    pub depth: u32,
    pub crawled_at: DateTime<Utc>,
}

/// Storage port for fetched pages
///
/// Identity derivation must be deterministic: the same URL maps to the same
/// identity across runs, which is what lets `exists` skip pages persisted by
/// an earlier run.
pub trait PageStore: Send + Sync {
    /// Returns true if a page for this URL has already been persisted
    fn exists(&self, url: &str) -> bool;

    /// Persists page content and returns its identity (the file name)
    fn save(&self, url: &str, content: &str, metadata: &PageMetadata) -> StorageResult<String>;
}
