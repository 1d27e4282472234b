//! Frontier: pending tasks, visited URLs, and completed results
//!
//! The frontier is owned by a single coordinating task. Fetch workers never
//! touch it; they hand their results back to the coordinator, which applies
//! them between batches.

use crate::state::eligibility::{EligibilityFilter, LinkDecision};
use crate::state::task::{CrawlResult, CrawlTask};
use crate::storage::PageStore;
use std::collections::{HashSet, VecDeque};

/// Pending/visited/completed crawl state
///
/// Invariants:
/// - a URL is never both visited and pending
/// - `visited` only grows
/// - `completed` is append-only
#[derive(Debug, Default)]
pub struct Frontier {
    visited: HashSet<String>,
    pending: VecDeque<CrawlTask>,
    pending_urls: HashSet<String>,
    completed: Vec<CrawlResult>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed task
    pub fn with_seed(seed: CrawlTask) -> Self {
        let mut frontier = Self::new();
        frontier.enqueue(seed);
        frontier
    }

    /// Rebuilds a frontier from persisted collections
    ///
    /// Pending tasks whose URL is already visited, and duplicate pending URLs,
    /// are dropped so the invariants hold even for a hand-edited checkpoint.
    pub fn from_parts(
        visited: impl IntoIterator<Item = String>,
        pending: impl IntoIterator<Item = CrawlTask>,
        completed: Vec<CrawlResult>,
    ) -> Self {
        let mut frontier = Self {
            visited: visited.into_iter().collect(),
            pending: VecDeque::new(),
            pending_urls: HashSet::new(),
            completed,
        };

        for task in pending {
            if !frontier.enqueue(task.clone()) {
                tracing::debug!("Dropping restored task already handled: {}", task.url);
            }
        }

        frontier
    }

    /// Adds a task unless its URL is already visited or pending
    ///
    /// Returns true if the task was added.
    pub fn enqueue(&mut self, task: CrawlTask) -> bool {
        if self.visited.contains(&task.url) || self.pending_urls.contains(&task.url) {
            return false;
        }
        self.pending_urls.insert(task.url.clone());
        self.pending.push_back(task);
        true
    }

    /// Removes up to `max` tasks from the front of the queue for dispatch
    ///
    /// Each task's URL is marked visited at this point, so in-flight URLs are
    /// excluded from rediscovery just like completed ones.
    pub fn take_batch(&mut self, max: usize) -> Vec<CrawlTask> {
        let count = max.min(self.pending.len());
        let batch: Vec<CrawlTask> = self.pending.drain(..count).collect();
        for task in &batch {
            self.pending_urls.remove(&task.url);
            self.visited.insert(task.url.clone());
        }
        batch
    }

    /// Appends a result and marks its URL visited
    pub fn record(&mut self, result: CrawlResult) {
        self.visited.insert(result.url().to_string());
        self.completed.push(result);
    }

    /// Marks a URL as handled without creating a task for it
    pub fn mark_visited(&mut self, url: impl Into<String>) {
        let url = url.into();
        if self.pending_urls.remove(&url) {
            self.pending.retain(|task| task.url != url);
        }
        self.visited.insert(url);
    }

    /// Runs a discovered link through the eligibility filter and applies the decision
    ///
    /// Eligible links become depth+1 tasks of `parent`; links whose page is
    /// already persisted are marked visited without a task.
    pub fn consider_link(
        &mut self,
        link: &str,
        parent: &CrawlTask,
        filter: &EligibilityFilter,
        store: &dyn PageStore,
    ) -> LinkDecision {
        let decision = filter.evaluate(link, self, store);
        match &decision {
            LinkDecision::Enqueue(url) => {
                self.enqueue(CrawlTask::child_of(parent, url.clone()));
            }
            LinkDecision::AlreadyPersisted(url) => {
                self.mark_visited(url.clone());
            }
            LinkDecision::Rejected(_) => {}
        }
        decision
    }

    /// True when the run should stop: nothing pending or the page cap is reached
    pub fn is_exhausted(&self, max_pages: usize) -> bool {
        self.pending.is_empty() || self.completed.len() >= max_pages
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending_urls.contains(url)
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Pending tasks in dispatch order
    pub fn pending(&self) -> impl Iterator<Item = &CrawlTask> {
        self.pending.iter()
    }

    pub fn completed(&self) -> &[CrawlResult] {
        &self.completed
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }
}
