//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The fetch port and its HTTP implementation
//! - HTML parsing and link extraction
//! - Admission-limited batch dispatch
//! - Overall crawl coordination and the run observer

mod coordinator;
mod fetcher;
mod observer;
mod parser;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchOutcome, FetchedPage, HttpFetcher, PageFetcher, UNTITLED};
pub use observer::{CrawlObserver, TracingObserver};
pub use parser::{internal_links, parse_html, ParsedPage};
pub use scheduler::{Scheduler, TaskOutcome};

use crate::config::{validate, Config};
use crate::output::{CrawlReport, SinglePageReport};
use crate::state::CrawlTask;
use crate::storage::{output_dir_for, CrawlMode, FileStore, PageStore};
use crate::url::normalize_url;
use crate::TidemarkError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Collaborators and switches for a website crawl
#[derive(Clone, Default)]
pub struct CrawlOptions {
    /// Ignore any existing checkpoint and start from the seed
    pub fresh: bool,

    /// Fetch port to use instead of [`HttpFetcher`]
    pub fetcher: Option<Arc<dyn PageFetcher>>,

    /// Observer to use instead of [`TracingObserver`]
    pub observer: Option<Arc<dyn CrawlObserver>>,
}

/// Output directory for a crawl: the explicit one, or one derived from the URL
pub fn resolve_output_dir(
    config: &Config,
    url: &Url,
    mode: CrawlMode,
    explicit: Option<&Path>,
) -> PathBuf {
    match explicit {
        Some(dir) => dir.to_path_buf(),
        None => output_dir_for(url, mode, Path::new(&config.output.base_dir)),
    }
}

fn fetcher_for(
    config: &Config,
    fetcher: Option<Arc<dyn PageFetcher>>,
) -> crate::Result<Arc<dyn PageFetcher>> {
    match fetcher {
        Some(fetcher) => Ok(fetcher),
        None => Ok(Arc::new(HttpFetcher::new(config)?)),
    }
}

/// Crawls a website starting from `seed_url`
///
/// Always returns a report: a top-level failure (bad seed, unwritable output
/// directory) yields a failure report instead of an error.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed_url` - Where the crawl starts
/// * `output_dir` - Explicit output directory; derived from the seed if absent
pub async fn crawl_website(config: &Config, seed_url: &str, output_dir: Option<&Path>) -> CrawlReport {
    crawl_website_with(config, seed_url, output_dir, CrawlOptions::default()).await
}

/// Like [`crawl_website`], with explicit collaborators
pub async fn crawl_website_with(
    config: &Config,
    seed_url: &str,
    output_dir: Option<&Path>,
    options: CrawlOptions,
) -> CrawlReport {
    match try_crawl_website(config, seed_url, output_dir, options).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl of {} failed: {}", seed_url, e);
            let dir = output_dir.map(Path::to_path_buf).or_else(|| {
                normalize_url(seed_url)
                    .ok()
                    .map(|url| resolve_output_dir(config, &url, CrawlMode::Website, None))
            });
            CrawlReport::failure(seed_url, e.to_string(), dir.as_deref())
        }
    }
}

async fn try_crawl_website(
    config: &Config,
    seed_url: &str,
    output_dir: Option<&Path>,
    options: CrawlOptions,
) -> crate::Result<CrawlReport> {
    let seed = normalize_url(seed_url)?;
    let dir = resolve_output_dir(config, &seed, CrawlMode::Website, output_dir);
    let fetcher = fetcher_for(config, options.fetcher)?;

    let mut coordinator =
        Coordinator::new(config.clone(), seed.as_str(), dir, fetcher)?.resume(!options.fresh);
    if let Some(observer) = options.observer {
        coordinator = coordinator.with_observer(observer);
    }

    coordinator.run().await
}

/// Fetches and stores exactly one page
///
/// No frontier and no checkpoint are involved. Failures are reported in the
/// returned shape, never raised.
pub async fn crawl_single_page(config: &Config, url: &str, output_dir: Option<&Path>) -> SinglePageReport {
    crawl_single_page_with(config, url, output_dir, None).await
}

/// Like [`crawl_single_page`], with an explicit fetch port
pub async fn crawl_single_page_with(
    config: &Config,
    url: &str,
    output_dir: Option<&Path>,
    fetcher: Option<Arc<dyn PageFetcher>>,
) -> SinglePageReport {
    match try_crawl_single_page(config, url, output_dir, fetcher).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Single-page crawl of {} failed: {}", url, e);
            SinglePageReport::failure(url, e.to_string(), output_dir)
        }
    }
}

async fn try_crawl_single_page(
    config: &Config,
    url: &str,
    output_dir: Option<&Path>,
    fetcher: Option<Arc<dyn PageFetcher>>,
) -> crate::Result<SinglePageReport> {
    validate(config)?;
    let target = normalize_url(url)?;
    let dir = resolve_output_dir(config, &target, CrawlMode::Single, output_dir);
    let fetcher = fetcher_for(config, fetcher)?;
    let store: Arc<dyn PageStore> = Arc::new(FileStore::create(&dir)?);

    let scheduler = Scheduler::new(1, Duration::ZERO, fetcher, store);
    let outcome = scheduler
        .dispatch_batch(vec![CrawlTask::seed(target.as_str())])
        .await
        .pop()
        .ok_or_else(|| TidemarkError::Fetch {
            url: target.to_string(),
            message: "no outcome for page".to_string(),
        })?;

    Ok(SinglePageReport::from_result(&outcome.result, &dir))
}
