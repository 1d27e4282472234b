//! Run-scoped observer for crawl events
//!
//! The coordinator reports progress through a [`CrawlObserver`] handed to it
//! at construction instead of logging from global state. [`TracingObserver`]
//! is the default and forwards every event to `tracing`.

use crate::output::CrawlReport;
use crate::state::{CrawlResult, CrawlTask, RejectReason};
use std::path::Path;

/// Receives crawl events from the coordinator
///
/// Every method has an empty default, so observers only implement the events
/// they care about.
pub trait CrawlObserver: Send + Sync {
    /// Called once before the first batch
    fn on_run_started(&self, _seed: &str, _resumed: bool, _pending: usize, _completed: usize) {}

    /// Called when a batch is handed to the dispatcher
    fn on_batch_dispatched(&self, _batch: usize, _tasks: &[CrawlTask]) {}

    /// Called once per dispatched task, successful or not
    fn on_page_completed(&self, _result: &CrawlResult) {}

    /// Called when a discovered link becomes a pending task
    fn on_task_enqueued(&self, _task: &CrawlTask) {}

    /// Called when a discovered link is not enqueued
    fn on_link_rejected(&self, _link: &str, _reason: &RejectReason) {}

    /// Called when a link is skipped because its page is already stored
    fn on_link_already_stored(&self, _url: &str) {}

    /// Called after each checkpoint save attempt
    fn on_checkpoint_saved(&self, _path: &Path, _saved: bool) {}

    /// Called once with the final report
    fn on_run_finished(&self, _report: &CrawlReport) {}
}

/// Observer that turns crawl events into tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_run_started(&self, seed: &str, resumed: bool, pending: usize, completed: usize) {
        if resumed {
            tracing::info!(
                "Resuming crawl of {}: {} pending, {} already completed",
                seed,
                pending,
                completed
            );
        } else {
            tracing::info!("Starting crawl of {}", seed);
        }
    }

    fn on_batch_dispatched(&self, batch: usize, tasks: &[CrawlTask]) {
        tracing::debug!("Dispatching batch {} with {} tasks", batch, tasks.len());
    }

    fn on_page_completed(&self, result: &CrawlResult) {
        match result.error() {
            None => tracing::info!(
                "Crawled {} (depth {}, {} chars, {} links)",
                result.url(),
                result.depth(),
                result.content_length(),
                result.links_count()
            ),
            Some(error) => tracing::warn!("Failed {}: {}", result.url(), error),
        }
    }

    fn on_task_enqueued(&self, task: &CrawlTask) {
        tracing::debug!("Enqueued {} at depth {}", task.url, task.depth);
    }

    fn on_link_rejected(&self, link: &str, reason: &RejectReason) {
        tracing::trace!("Skipping {}: {}", link, reason);
    }

    fn on_link_already_stored(&self, url: &str) {
        tracing::debug!("Already stored, marking visited: {}", url);
    }

    fn on_checkpoint_saved(&self, path: &Path, saved: bool) {
        if saved {
            tracing::debug!("Checkpoint written to {}", path.display());
        }
    }

    fn on_run_finished(&self, report: &CrawlReport) {
        tracing::info!(
            "Crawl finished: {}/{} pages succeeded ({}) in {:.2}s",
            report.successful_pages,
            report.total_pages,
            report.success_rate,
            report.total_duration
        );
    }
}
