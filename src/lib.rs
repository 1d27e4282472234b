//! Tidemark: a bounded, polite, resumable website crawler
//!
//! This crate discovers and fetches pages within a single site, up to configured
//! depth and page limits, persisting each page and checkpointing progress so an
//! interrupted crawl can resume without refetching or exceeding its limits.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Tidemark operations
#[derive(Debug, Error)]
pub enum TidemarkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] storage::CheckpointError),

    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Tidemark operations
pub type Result<T> = std::result::Result<T, TidemarkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl_single_page, crawl_website, Coordinator};
pub use output::{CrawlReport, SinglePageReport};
pub use state::{CrawlResult, CrawlTask, Frontier};
pub use url::{is_same_origin, normalize_url, UrlFilters};
