//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator is the single owner of the frontier. It runs the state
//! machine Loading-Checkpoint → Running(batch) → Finalizing:
//! - Restoring the frontier from a checkpoint, or seeding it
//! - Taking batches of at most `max_concurrent` tasks and dispatching them
//! - Recording every outcome and expanding the frontier from discovered links
//! - Checkpointing, then producing the report and output artifacts

use crate::config::{validate, Config};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::observer::{CrawlObserver, TracingObserver};
use crate::crawler::scheduler::{Scheduler, TaskOutcome};
use crate::output::{write_artifacts, CrawlReport};
use crate::state::{CrawlTask, EligibilityFilter, Frontier, LinkDecision};
use crate::storage::{Checkpoint, CheckpointManager, FileStore, PageStore, RunStats};
use crate::url::{normalize_url, UrlFilters};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    seed: Url,
    output_dir: PathBuf,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn PageStore>,
    observer: Arc<dyn CrawlObserver>,
    checkpoints: CheckpointManager,
    resume: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Pages are stored as files under `output_dir`, which is created if it
    /// does not exist.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `seed_url` - Where the crawl starts; normalized before use
    /// * `output_dir` - Directory for pages, checkpoint and artifacts
    /// * `fetcher` - Fetch port used for every page
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(TidemarkError)` - Invalid configuration or seed, or the output
    ///   directory could not be created
    pub fn new(
        config: Config,
        seed_url: &str,
        output_dir: impl Into<PathBuf>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> crate::Result<Self> {
        validate(&config)?;
        let seed = normalize_url(seed_url)?;
        let output_dir = output_dir.into();
        let store = FileStore::create(&output_dir)?;

        Ok(Self {
            config,
            seed,
            checkpoints: CheckpointManager::new(&output_dir),
            output_dir,
            fetcher,
            store: Arc::new(store),
            observer: Arc::new(TracingObserver),
            resume: true,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replaces the file store with another storage port
    pub fn with_store(mut self, store: Arc<dyn PageStore>) -> Self {
        self.store = store;
        self
    }

    /// Whether an existing checkpoint is picked up (the default)
    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn checkpoint_path(&self) -> &Path {
        self.checkpoints.path()
    }

    /// Runs the crawl to completion
    ///
    /// Per-page failures never fail the run; they are part of the report.
    pub async fn run(&self) -> crate::Result<CrawlReport> {
        let span = tracing::info_span!(
            "crawl_run",
            seed = %self.seed,
            output = %self.output_dir.display()
        );
        self.run_batches().instrument(span).await
    }

    async fn run_batches(&self) -> crate::Result<CrawlReport> {
        let crawler = &self.config.crawler;
        let (mut frontier, mut stats) = self.load_or_seed();

        let filter = EligibilityFilter::new(
            self.seed.clone(),
            UrlFilters::from(&self.config.filters),
            crawler.max_pages,
        );
        let scheduler = Scheduler::new(
            crawler.max_concurrent,
            Duration::from_millis(crawler.delay_ms),
            self.fetcher.clone(),
            self.store.clone(),
        );

        let mut batch_number = 0;
        while !frontier.is_exhausted(crawler.max_pages) {
            let batch = frontier.take_batch(crawler.max_concurrent);
            batch_number += 1;
            stats.total_processed += batch.len() as u64;
            self.observer.on_batch_dispatched(batch_number, &batch);

            for outcome in scheduler.dispatch_batch(batch).await {
                self.apply_outcome(&mut frontier, &filter, outcome);
            }

            if crawler.checkpoint_every_batch {
                self.save_checkpoint(&frontier, &stats);
            }
        }

        tracing::info!(
            "Frontier exhausted after {} batches: {} completed, {} pending",
            batch_number,
            frontier.completed_len(),
            frontier.pending_len()
        );

        Ok(self.finalize(&frontier, &stats))
    }

    /// Restores frontier and counters from the checkpoint, or seeds a fresh run
    fn load_or_seed(&self) -> (Frontier, RunStats) {
        let seed = self.seed.as_str();

        if self.resume {
            if let Some(checkpoint) = self.checkpoints.load(seed) {
                let (frontier, stats) = checkpoint.into_frontier();
                self.observer.on_run_started(
                    seed,
                    true,
                    frontier.pending_len(),
                    frontier.completed_len(),
                );
                return (frontier, stats);
            }
        }

        let frontier = Frontier::with_seed(CrawlTask::seed(seed));
        self.observer.on_run_started(seed, false, 1, 0);
        (frontier, RunStats::starting_now())
    }

    /// Records one outcome and expands the frontier from its links
    fn apply_outcome(&self, frontier: &mut Frontier, filter: &EligibilityFilter, outcome: TaskOutcome) {
        let TaskOutcome {
            task,
            result,
            links,
        } = outcome;

        self.observer.on_page_completed(&result);
        let succeeded = result.is_success();
        frontier.record(result);

        let crawler = &self.config.crawler;
        if !succeeded
            || task.depth >= crawler.max_depth
            || frontier.completed_len() >= crawler.max_pages
        {
            return;
        }

        let mut enqueued = 0;
        for link in &links {
            let decision = frontier.consider_link(link, &task, filter, self.store.as_ref());
            if decision.is_enqueue() {
                enqueued += 1;
            }
            match decision {
                LinkDecision::Enqueue(url) => {
                    self.observer
                        .on_task_enqueued(&CrawlTask::child_of(&task, url));
                }
                LinkDecision::AlreadyPersisted(url) => {
                    self.observer.on_link_already_stored(&url);
                }
                LinkDecision::Rejected(reason) => {
                    self.observer.on_link_rejected(link, &reason);
                }
            }
        }
        tracing::debug!(
            "{}: {} of {} links enqueued at depth {}",
            task.url,
            enqueued,
            links.len(),
            task.depth + 1
        );
    }

    fn save_checkpoint(&self, frontier: &Frontier, stats: &RunStats) {
        let checkpoint = Checkpoint::capture(self.seed.as_str(), frontier, stats);
        let saved = self.checkpoints.save(&checkpoint);
        self.observer
            .on_checkpoint_saved(self.checkpoints.path(), saved);
    }

    fn finalize(&self, frontier: &Frontier, stats: &RunStats) -> CrawlReport {
        let report = CrawlReport::aggregate(
            self.seed.as_str(),
            stats.start_time,
            Utc::now(),
            &self.output_dir,
            frontier.completed(),
        );

        self.save_checkpoint(frontier, stats);
        write_artifacts(&report, &self.output_dir);
        self.observer.on_run_finished(&report);

        report
    }
}
