//! Storage module for persisting crawl output
//!
//! This module handles everything the crawler writes to disk:
//! - One markdown document per fetched page
//! - Deterministic page file names and run output directories
//! - The resumable crawl checkpoint

mod checkpoint;
mod files;
mod paths;
mod traits;

pub use checkpoint::{
    Checkpoint, CheckpointError, CheckpointManager, RunStats, CHECKPOINT_FILE_NAME,
};
pub use files::{render_page, FileStore};
pub use paths::{filename_for_url, output_dir_for, sanitize_name, CrawlMode, PAGE_EXTENSION};
pub use traits::{PageMetadata, PageStore, StorageError, StorageResult};
