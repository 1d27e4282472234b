//! Admission-limited batch dispatch
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore shared by every batch
//! - Running fetch + store for each task in isolation from the frontier
//! - Converting port errors and panics into failed results
//! - The fixed polite delay after each fetch

use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use crate::state::{CrawlResult, CrawlTask};
use crate::storage::{PageMetadata, PageStore};
use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// What one dispatched task produced
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task: CrawlTask,
    pub result: CrawlResult,
    /// Internal links reported by the fetch; empty on failure
    pub links: Vec<String>,
}

impl TaskOutcome {
    fn failed(task: &CrawlTask, error: impl Into<String>) -> Self {
        Self {
            task: task.clone(),
            result: CrawlResult::failed(task, error),
            links: Vec::new(),
        }
    }
}

/// Dispatches batches of tasks through the fetch and storage ports
///
/// The scheduler never sees the frontier: it takes owned tasks and hands back
/// outcomes, leaving all frontier mutation to the coordinator.
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Courtesy pause after every fetch
    delay: Duration,

    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn PageStore>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum number of fetches in flight at once
    /// * `delay` - Polite delay applied after each fetch
    /// * `fetcher` - Fetch port
    /// * `store` - Storage port
    pub fn new(
        max_concurrent: usize,
        delay: Duration,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            delay,
            fetcher,
            store,
        }
    }

    /// Number of fetch slots currently free
    #[cfg(test)]
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Runs every task of the batch concurrently and waits for all of them
    ///
    /// Outcomes are returned in batch order regardless of completion order.
    /// No outcome is ever lost: errors and panics become failed results.
    pub async fn dispatch_batch(&self, batch: Vec<CrawlTask>) -> Vec<TaskOutcome> {
        join_all(batch.into_iter().map(|task| self.run_task(task))).await
    }

    async fn run_task(&self, task: CrawlTask) -> TaskOutcome {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => return TaskOutcome::failed(&task, e.to_string()),
        };

        let outcome = match AssertUnwindSafe(self.attempt(&task)).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => TaskOutcome::failed(&task, e.to_string()),
            Err(panic) => TaskOutcome::failed(&task, panic_message(panic.as_ref())),
        };

        // Applied whatever happened, while the slot is still held
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        outcome
    }

    async fn attempt(&self, task: &CrawlTask) -> crate::Result<TaskOutcome> {
        match self.fetcher.fetch(&task.url).await? {
            FetchOutcome::Success(page) => {
                let metadata = PageMetadata {
                    title: page.title.clone(),
                    depth: task.depth,
                    crawled_at: Utc::now(),
                };
                let filename = self.store.save(&task.url, &page.content, &metadata)?;

                Ok(TaskOutcome {
                    task: task.clone(),
                    result: CrawlResult::succeeded(
                        task,
                        page.title,
                        page.content_length,
                        page.internal_links.len(),
                        filename,
                    ),
                    links: page.internal_links,
                })
            }
            FetchOutcome::Failure { error } => Ok(TaskOutcome::failed(task, error)),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("fetch panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("fetch panicked: {}", message)
    } else {
        "fetch panicked".to_string()
    }
}
