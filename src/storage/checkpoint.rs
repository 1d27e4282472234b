//! Checkpoint persistence for resumable crawls
//!
//! A checkpoint captures the frontier (visited, pending, completed) plus run
//! bookkeeping as a single JSON document in the output directory. Saving is
//! atomic (write to a temporary file, then rename) so an interrupted write
//! never leaves a truncated checkpoint behind.

use crate::state::{CrawlResult, CrawlTask, Frontier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the checkpoint inside a run's output directory
pub const CHECKPOINT_FILE_NAME: &str = "crawl_checkpoint.json";

/// Errors raised while reading or writing a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed checkpoint: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Checkpoint belongs to {found}, not {expected}")]
    SeedMismatch { expected: String, found: String },
}

/// Run bookkeeping carried across resumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Tasks dispatched so far, across all resumed runs
    pub total_processed: u64,
    /// When the first run of this crawl started
    pub start_time: DateTime<Utc>,
}

impl RunStats {
    pub fn starting_now() -> Self {
        Self {
            total_processed: 0,
            start_time: Utc::now(),
        }
    }
}

/// Serialized crawl state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub timestamp: DateTime<Utc>,
    pub seed_url: String,
    pub visited_urls: Vec<String>,
    pub pending_tasks: Vec<CrawlTask>,
    pub completed_results: Vec<CrawlResult>,
    pub stats: RunStats,
}

impl Checkpoint {
    /// Snapshots the frontier; visited URLs are sorted for stable output
    pub fn capture(seed_url: &str, frontier: &Frontier, stats: &RunStats) -> Self {
        let mut visited_urls: Vec<String> = frontier.visited().iter().cloned().collect();
        visited_urls.sort();

        Self {
            timestamp: Utc::now(),
            seed_url: seed_url.to_string(),
            visited_urls,
            pending_tasks: frontier.pending().cloned().collect(),
            completed_results: frontier.completed().to_vec(),
            stats: stats.clone(),
        }
    }

    /// Rebuilds the frontier and run stats this checkpoint describes
    pub fn into_frontier(self) -> (Frontier, RunStats) {
        let frontier =
            Frontier::from_parts(self.visited_urls, self.pending_tasks, self.completed_results);
        (frontier, self.stats)
    }
}

/// Reads and writes the checkpoint file for one output directory
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    path: PathBuf,
}

impl CheckpointManager {
    /// Manager for `<output_dir>/crawl_checkpoint.json`
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(CHECKPOINT_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the checkpoint atomically
    pub fn try_save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(checkpoint)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Best-effort save; failures are logged and reported as `false`
    pub fn save(&self, checkpoint: &Checkpoint) -> bool {
        match self.try_save(checkpoint) {
            Ok(()) => {
                tracing::debug!(
                    "Checkpoint saved: {} visited, {} pending, {} completed",
                    checkpoint.visited_urls.len(),
                    checkpoint.pending_tasks.len(),
                    checkpoint.completed_results.len()
                );
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save checkpoint {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Loads the checkpoint for `seed_url`
    ///
    /// Returns `Ok(None)` when no checkpoint file exists.
    pub fn try_load(&self, seed_url: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let checkpoint: Checkpoint = serde_json::from_str(&json)?;
        if checkpoint.seed_url != seed_url {
            return Err(CheckpointError::SeedMismatch {
                expected: seed_url.to_string(),
                found: checkpoint.seed_url,
            });
        }

        Ok(Some(checkpoint))
    }

    /// Best-effort load; an unreadable, malformed, or foreign checkpoint is
    /// logged and treated as absent
    pub fn load(&self, seed_url: &str) -> Option<Checkpoint> {
        match self.try_load(seed_url) {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                tracing::warn!(
                    "Ignoring checkpoint {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }
}
