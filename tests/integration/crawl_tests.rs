//! Integration tests for the crawler
//!
//! Traversal properties are exercised against a scripted in-memory fetch
//! port; the HTTP fetch adapter is tested end-to-end against wiremock.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tidemark::config::Config;
use tidemark::crawler::{
    crawl_single_page_with, crawl_website_with, CrawlObserver, CrawlOptions, FetchOutcome,
    FetchedPage, HttpFetcher, PageFetcher,
};
use tidemark::output::{read_index, CrawlReport, INDEX_FILE_NAME, SUMMARY_FILE_NAME};
use tidemark::state::{CrawlResult, CrawlTask, Frontier};
use tidemark::storage::{
    Checkpoint, CheckpointManager, FileStore, PageMetadata, PageStore, RunStats,
};
use tidemark::TidemarkError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEED: &str = "https://a.test/";

/// How the scripted fetcher answers one URL
#[derive(Clone)]
enum Script {
    Page(Vec<String>),
    Fail(&'static str),
    Error,
    Panic,
}

/// Fetch port answering from a fixed script and recording every call
///
/// URLs without a script fail with `HTTP 404`.
struct ScriptedFetcher {
    script: HashMap<String, Script>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self {
            script: HashMap::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.script.insert(
            url.to_string(),
            Script::Page(links.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    fn with(mut self, url: &str, script: Script) -> Self {
        self.script.insert(url.to_string(), script);
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> tidemark::Result<FetchOutcome> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.script.get(url).cloned() {
            Some(Script::Page(links)) => Ok(FetchOutcome::Success(FetchedPage::new(
                format!("Title of {}", url),
                format!("Content of {}", url),
                links,
            ))),
            Some(Script::Fail(reason)) => Ok(FetchOutcome::failure(reason)),
            Some(Script::Error) => Err(TidemarkError::Fetch {
                url: url.to_string(),
                message: "browser crashed".to_string(),
            }),
            Some(Script::Panic) => panic!("renderer panicked on {}", url),
            None => Ok(FetchOutcome::failure("HTTP 404")),
        }
    }
}

/// Observer recording enqueued tasks and run starts
#[derive(Default)]
struct RecordingObserver {
    enqueued: Mutex<Vec<CrawlTask>>,
    starts: Mutex<Vec<bool>>,
    batches: Mutex<usize>,
    checkpoints: Mutex<Vec<bool>>,
    finished: Mutex<usize>,
}

impl CrawlObserver for RecordingObserver {
    fn on_run_started(&self, _seed: &str, resumed: bool, _pending: usize, _completed: usize) {
        self.starts.lock().unwrap().push(resumed);
    }

    fn on_batch_dispatched(&self, _batch: usize, _tasks: &[CrawlTask]) {
        *self.batches.lock().unwrap() += 1;
    }

    fn on_task_enqueued(&self, task: &CrawlTask) {
        self.enqueued.lock().unwrap().push(task.clone());
    }

    fn on_checkpoint_saved(&self, _path: &Path, saved: bool) {
        self.checkpoints.lock().unwrap().push(saved);
    }

    fn on_run_finished(&self, _report: &CrawlReport) {
        *self.finished.lock().unwrap() += 1;
    }
}

/// Fetch port that reads the on-disk checkpoint when asked for one URL
struct CheckpointReadingFetcher {
    inner: ScriptedFetcher,
    dir: PathBuf,
    watch: String,
    seen: Mutex<Option<Checkpoint>>,
}

#[async_trait]
impl PageFetcher for CheckpointReadingFetcher {
    async fn fetch(&self, url: &str) -> tidemark::Result<FetchOutcome> {
        if url == self.watch {
            let checkpoint = CheckpointManager::new(&self.dir).try_load(SEED)?;
            *self.seen.lock().unwrap() = checkpoint;
        }
        self.inner.fetch(url).await
    }
}

/// Creates a test configuration with no polite delay
fn create_test_config(max_depth: u32, max_pages: usize, max_concurrent: usize) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.max_pages = max_pages;
    config.crawler.max_concurrent = max_concurrent;
    config.crawler.delay_ms = 0;
    config
}

async fn run_crawl(
    config: &Config,
    dir: &Path,
    fetcher: Arc<ScriptedFetcher>,
    fresh: bool,
) -> CrawlReport {
    let options = CrawlOptions {
        fresh,
        fetcher: Some(fetcher),
        observer: None,
    };
    crawl_website_with(config, SEED, Some(dir), options).await
}

fn urls(report: &CrawlReport) -> Vec<&str> {
    report.pages.iter().map(|r| r.url()).collect()
}

#[tokio::test]
async fn test_same_origin_expansion() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(
                SEED,
                &["https://a.test/x", "https://a.test/y", "https://b.test/z"],
            )
            .page("https://a.test/x", &[])
            .page("https://a.test/y", &[]),
    );

    let report = run_crawl(&create_test_config(1, 5, 2), dir.path(), fetcher.clone(), false).await;

    assert!(report.success);
    assert_eq!(report.total_pages, 3);
    assert_eq!(report.successful_pages, 3);
    assert_eq!(
        urls(&report),
        vec![SEED, "https://a.test/x", "https://a.test/y"]
    );
    assert!(fetcher.fetched().iter().all(|u| u.starts_with("https://a.test/")));
}

#[tokio::test]
async fn test_fetch_error_becomes_failed_result() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(SEED, &["https://a.test/x"])
            .with("https://a.test/x", Script::Error),
    );

    let report = run_crawl(&create_test_config(1, 5, 2), dir.path(), fetcher, false).await;

    assert!(report.success);
    let failed: &CrawlResult = report
        .pages
        .iter()
        .find(|r| r.url() == "https://a.test/x")
        .unwrap();
    assert!(!failed.is_success());
    assert_eq!(failed.depth(), 1);
    assert!(failed.error().unwrap().contains("browser crashed"));
    assert_eq!(report.failed_pages, 1);
}

#[tokio::test]
async fn test_fetch_panic_becomes_failed_result() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(SEED, &["https://a.test/x", "https://a.test/y"])
            .with("https://a.test/x", Script::Panic)
            .page("https://a.test/y", &[]),
    );

    let report = run_crawl(&create_test_config(1, 5, 2), dir.path(), fetcher, false).await;

    assert!(report.success);
    assert_eq!(report.total_pages, 3);
    assert_eq!(report.successful_pages, 2);
    let failed: Vec<&CrawlResult> = report.failed_results().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].url(), "https://a.test/x");
    assert!(!failed[0].error().unwrap().is_empty());
}

#[tokio::test]
async fn test_page_cap_of_one() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new().page(
        SEED,
        &["https://a.test/a", "https://a.test/b", "https://a.test/c"],
    ));

    let report = run_crawl(&create_test_config(2, 1, 3), dir.path(), fetcher.clone(), false).await;

    assert_eq!(report.total_pages, 1);
    assert_eq!(fetcher.fetched(), vec![SEED.to_string()]);

    let checkpoint = CheckpointManager::new(dir.path())
        .try_load(SEED)
        .unwrap()
        .unwrap();
    assert!(checkpoint.pending_tasks.is_empty());
    assert_eq!(checkpoint.completed_results.len(), 1);
}

#[tokio::test]
async fn test_no_duplicate_fetches() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(
                SEED,
                &["https://a.test/a", "https://a.test/b", "https://a.test/a#top"],
            )
            .page(
                "https://a.test/a",
                &[SEED, "https://a.test/b", "https://a.test/c"],
            )
            .page(
                "https://a.test/b",
                &["https://a.test/a", "https://a.test/c", "https://A.TEST/c"],
            )
            .page("https://a.test/c", &[SEED, "https://a.test/a"]),
    );

    let report = run_crawl(&create_test_config(3, 20, 2), dir.path(), fetcher.clone(), false).await;

    let fetched = fetcher.fetched();
    let unique: HashSet<&String> = fetched.iter().collect();
    assert_eq!(unique.len(), fetched.len());
    assert_eq!(fetched.len(), 4);
    assert_eq!(report.total_pages, 4);
}

#[tokio::test]
async fn test_capacity_bound() {
    let links: Vec<String> = (0..30).map(|i| format!("https://a.test/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let mut scripted = ScriptedFetcher::new().page(SEED, &link_refs);
    for link in &links {
        scripted = scripted.page(link, &link_refs);
    }
    let fetcher = Arc::new(scripted);

    let max_pages = 7;
    let max_concurrent = 3;
    let dir = TempDir::new().unwrap();
    let report = run_crawl(
        &create_test_config(3, max_pages, max_concurrent),
        dir.path(),
        fetcher.clone(),
        false,
    )
    .await;

    assert!(report.total_pages <= max_pages + max_concurrent - 1);
    assert!(report.total_pages >= max_pages);
    assert_eq!(fetcher.fetched().len(), report.total_pages);
}

#[tokio::test]
async fn test_depth_bound() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(SEED, &["https://a.test/1"])
            .page("https://a.test/1", &["https://a.test/2"])
            .page("https://a.test/2", &["https://a.test/3"])
            .page("https://a.test/3", &["https://a.test/4"]),
    );
    let observer = Arc::new(RecordingObserver::default());
    let options = CrawlOptions {
        fresh: false,
        fetcher: Some(fetcher.clone()),
        observer: Some(observer.clone()),
    };

    let report = crawl_website_with(&create_test_config(2, 10, 2), SEED, Some(dir.path()), options).await;

    assert_eq!(
        fetcher.fetched(),
        vec![SEED, "https://a.test/1", "https://a.test/2"]
    );
    assert!(report.pages.iter().all(|r| r.depth() <= 2));
    assert!(observer
        .enqueued
        .lock()
        .unwrap()
        .iter()
        .all(|t| t.depth <= 2 && t.parent_url.is_some()));
    assert_eq!(*observer.starts.lock().unwrap(), vec![false]);
    assert_eq!(*observer.finished.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_exclude_wins_over_include() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(
                SEED,
                &[
                    "https://a.test/docs/intro",
                    "https://a.test/docs/private/keys",
                    "https://a.test/blog/post",
                ],
            )
            .page("https://a.test/docs/intro", &[]),
    );
    let mut config = create_test_config(1, 10, 2);
    config.filters.include = vec!["/docs/".to_string()];
    config.filters.exclude = vec!["private".to_string()];

    let report = run_crawl(&config, dir.path(), fetcher.clone(), false).await;

    assert_eq!(urls(&report), vec![SEED, "https://a.test/docs/intro"]);
}

#[tokio::test]
async fn test_resume_after_completion_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(1, 5, 2);
    let graph = || {
        ScriptedFetcher::new()
            .page(SEED, &["https://a.test/x", "https://a.test/y"])
            .page("https://a.test/x", &[])
            .page("https://a.test/y", &[])
    };

    let first = run_crawl(&config, dir.path(), Arc::new(graph()), false).await;
    assert_eq!(first.total_pages, 3);

    let second_fetcher = Arc::new(graph());
    let second = run_crawl(&config, dir.path(), second_fetcher.clone(), false).await;

    assert!(second_fetcher.fetched().is_empty());
    assert_eq!(second.total_pages, first.total_pages);
    assert_eq!(urls(&second), urls(&first));
}

#[tokio::test]
async fn test_resume_from_partial_checkpoint() {
    let dir = TempDir::new().unwrap();

    let mut frontier = Frontier::with_seed(CrawlTask::seed(SEED));
    let batch = frontier.take_batch(1);
    frontier.record(CrawlResult::succeeded(&batch[0], "Home", 10, 1, "a_test_index.md"));
    frontier.enqueue(CrawlTask::child_of(&batch[0], "https://a.test/x"));
    let stats = RunStats {
        total_processed: 1,
        start_time: Utc::now() - ChronoDuration::hours(1),
    };
    CheckpointManager::new(dir.path())
        .try_save(&Checkpoint::capture(SEED, &frontier, &stats))
        .unwrap();

    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(SEED, &["https://a.test/x"])
            .page("https://a.test/x", &[]),
    );
    let observer = Arc::new(RecordingObserver::default());
    let options = CrawlOptions {
        fresh: false,
        fetcher: Some(fetcher.clone()),
        observer: Some(observer.clone()),
    };
    let report = crawl_website_with(&create_test_config(1, 5, 2), SEED, Some(dir.path()), options).await;

    assert_eq!(fetcher.fetched(), vec!["https://a.test/x".to_string()]);
    assert_eq!(urls(&report), vec![SEED, "https://a.test/x"]);
    assert!(report.total_duration >= 3600.0);
    assert_eq!(*observer.starts.lock().unwrap(), vec![true]);

    let checkpoint = CheckpointManager::new(dir.path())
        .try_load(SEED)
        .unwrap()
        .unwrap();
    assert_eq!(checkpoint.stats.total_processed, 2);
    assert_eq!(checkpoint.stats.start_time, stats.start_time);
}

#[tokio::test]
async fn test_checkpoint_written_between_batches() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(CheckpointReadingFetcher {
        inner: ScriptedFetcher::new()
            .page(SEED, &["https://a.test/x", "https://a.test/y"])
            .page("https://a.test/x", &[])
            .page("https://a.test/y", &[]),
        dir: dir.path().to_path_buf(),
        watch: "https://a.test/x".to_string(),
        seen: Mutex::new(None),
    });
    let options = CrawlOptions {
        fresh: false,
        fetcher: Some(fetcher.clone()),
        observer: None,
    };

    let report = crawl_website_with(&create_test_config(1, 5, 1), SEED, Some(dir.path()), options).await;
    assert_eq!(report.total_pages, 3);

    let seen = fetcher.seen.lock().unwrap().take().unwrap();
    assert_eq!(seen.completed_results.len(), 1);
    assert_eq!(seen.completed_results[0].url(), SEED);
    assert!(seen.completed_results[0].is_success());
    assert_eq!(seen.stats.total_processed, 1);
    let pending: Vec<&str> = seen.pending_tasks.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(pending, vec!["https://a.test/x", "https://a.test/y"]);
}

async fn count_checkpoint_saves(every_batch: bool) -> (usize, Vec<bool>) {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(1, 5, 1);
    config.crawler.checkpoint_every_batch = every_batch;
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(SEED, &["https://a.test/x", "https://a.test/y"])
            .page("https://a.test/x", &[])
            .page("https://a.test/y", &[]),
    );
    let observer = Arc::new(RecordingObserver::default());
    let options = CrawlOptions {
        fresh: false,
        fetcher: Some(fetcher),
        observer: Some(observer.clone()),
    };

    crawl_website_with(&config, SEED, Some(dir.path()), options).await;

    let batches = *observer.batches.lock().unwrap();
    let saves = observer.checkpoints.lock().unwrap().clone();
    (batches, saves)
}

#[tokio::test]
async fn test_checkpoint_saved_after_every_batch_and_at_finish() {
    let (batches, saves) = count_checkpoint_saves(true).await;

    assert_eq!(batches, 3);
    assert_eq!(saves.len(), batches + 1);
    assert!(saves.iter().all(|saved| *saved));
}

#[tokio::test]
async fn test_checkpoint_saved_only_at_finish_when_batching_disabled() {
    let (batches, saves) = count_checkpoint_saves(false).await;

    assert_eq!(batches, 3);
    assert_eq!(saves, vec![true]);
}

#[tokio::test]
async fn test_corrupt_checkpoint_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let manager = CheckpointManager::new(dir.path());
    fs::write(manager.path(), "{\"visited_urls\": [").unwrap();

    let fetcher = Arc::new(ScriptedFetcher::new().page(SEED, &[]));
    let report = run_crawl(&create_test_config(1, 5, 2), dir.path(), fetcher.clone(), false).await;

    assert!(report.success);
    assert_eq!(fetcher.fetched(), vec![SEED.to_string()]);
    assert!(manager.try_load(SEED).unwrap().is_some());
}

#[tokio::test]
async fn test_persisted_pages_are_not_refetched() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::create(dir.path()).unwrap();
    let metadata = PageMetadata {
        title: "X".to_string(),
        depth: 1,
        crawled_at: Utc::now(),
    };
    store.save("https://a.test/x", "old", &metadata).unwrap();

    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(SEED, &["https://a.test/x", "https://a.test/y"])
            .page("https://a.test/y", &[]),
    );
    let report = run_crawl(&create_test_config(1, 5, 2), dir.path(), fetcher.clone(), false).await;

    assert_eq!(
        fetcher.fetched(),
        vec![SEED.to_string(), "https://a.test/y".to_string()]
    );
    assert_eq!(report.total_pages, 2);

    let checkpoint = CheckpointManager::new(dir.path())
        .try_load(SEED)
        .unwrap()
        .unwrap();
    assert!(checkpoint
        .visited_urls
        .contains(&"https://a.test/x".to_string()));
}

#[tokio::test]
async fn test_fresh_run_ignores_checkpoint() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(1, 5, 2);
    let graph = || ScriptedFetcher::new().page(SEED, &["https://a.test/x"]).page("https://a.test/x", &[]);

    run_crawl(&config, dir.path(), Arc::new(graph()), false).await;

    let fetcher = Arc::new(graph());
    let report = run_crawl(&config, dir.path(), fetcher.clone(), true).await;

    // The seed is fetched again; its child is already on disk
    assert_eq!(fetcher.fetched(), vec![SEED.to_string()]);
    assert_eq!(report.total_pages, 1);
}

#[tokio::test]
async fn test_artifacts_written() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(SEED, &["https://a.test/x"])
            .with("https://a.test/x", Script::Fail("HTTP 503")),
    );

    let report = run_crawl(&create_test_config(1, 5, 2), dir.path(), fetcher, false).await;

    let index = read_index(&dir.path().join(INDEX_FILE_NAME)).unwrap();
    assert_eq!(index.pages, report.pages);
    assert_eq!(index.total_pages, 2);
    assert_eq!(index.success_rate, "50.0%");

    let summary = fs::read_to_string(dir.path().join(SUMMARY_FILE_NAME)).unwrap();
    assert!(summary.contains("HTTP 503"));

    let page = fs::read_to_string(dir.path().join("a_test_index.md")).unwrap();
    assert!(page.starts_with("# Title of https://a.test/"));
    assert!(page.contains("Content of https://a.test/"));
}

#[tokio::test]
async fn test_invalid_seed_yields_failure_report() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let options = CrawlOptions {
        fresh: false,
        fetcher: Some(fetcher.clone()),
        observer: None,
    };

    let report = crawl_website_with(
        &create_test_config(1, 5, 2),
        "ftp://a.test/",
        Some(dir.path()),
        options,
    )
    .await;

    assert!(!report.success);
    assert!(report.error.is_some());
    assert_eq!(report.total_pages, 0);
    assert!(report.pages.is_empty());
    assert!(fetcher.fetched().is_empty());
}

#[tokio::test]
async fn test_output_dir_derived_from_seed() {
    let base = TempDir::new().unwrap();
    let mut config = create_test_config(0, 5, 1);
    config.output.base_dir = base.path().display().to_string();
    let options = CrawlOptions {
        fresh: false,
        fetcher: Some(Arc::new(ScriptedFetcher::new().page("https://www.a.test/docs", &[]))),
        observer: None,
    };

    let report = crawl_website_with(&config, "www.a.test/docs", None, options).await;

    let expected = base.path().join("a.test_docs_website");
    assert_eq!(report.output_directory, expected.display().to_string());
    assert!(expected.join(INDEX_FILE_NAME).is_file());
}

// HTTP fetch adapter against a mock server

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_http_crawl_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
                <p>Welcome home</p>
                <a href="/page1">Page 1</a>
                <a href="/page1#section">Page 1 again</a>
                <a href="/missing">Missing</a>
                <a href="/report.pdf">Report</a>
                <a href="https://elsewhere.test/">Elsewhere</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><head><title>Page 1</title></head><body><a href="/">Home</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(2, 10, 2);
    config.crawler.page_timeout_secs = 5;

    let seed = format!("{}/", base_url);
    let options = CrawlOptions {
        fresh: true,
        fetcher: Some(Arc::new(HttpFetcher::new(&config).unwrap())),
        observer: None,
    };
    let report = crawl_website_with(&config, &seed, Some(dir.path()), options).await;

    assert!(report.success);
    assert_eq!(report.total_pages, 4);
    assert_eq!(report.successful_pages, 2);
    assert_eq!(report.failed_pages, 2);

    let home = &report.pages[0];
    assert_eq!(home.url(), seed);
    assert_eq!(home.title(), "Home");
    assert_eq!(home.links_count(), 3);

    let missing = report
        .pages
        .iter()
        .find(|r| r.url().ends_with("/missing"))
        .unwrap();
    assert_eq!(missing.error(), Some("HTTP 404"));

    let pdf = report
        .pages
        .iter()
        .find(|r| r.url().ends_with("/report.pdf"))
        .unwrap();
    assert!(pdf.error().unwrap().starts_with("Unsupported content type"));

    assert!(report
        .pages
        .iter()
        .all(|r| r.url().starts_with(&base_url)));
}

#[tokio::test]
async fn test_http_fetcher_defaults_title() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(html("<html><body>Just   text</body></html>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&create_test_config(1, 5, 1)).unwrap();
    let outcome = fetcher
        .fetch(&format!("{}/plain", mock_server.uri()))
        .await
        .unwrap();

    match outcome {
        FetchOutcome::Success(page) => {
            assert_eq!(page.title, "Untitled");
            assert_eq!(page.content, "Just text");
            assert_eq!(page.content_length, 9);
            assert!(page.internal_links.is_empty());
        }
        FetchOutcome::Failure { error } => panic!("unexpected failure: {}", error),
    }
}

#[tokio::test]
async fn test_http_fetcher_reports_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&create_test_config(1, 5, 1)).unwrap();
    let outcome = fetcher
        .fetch(&format!("{}/broken", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome, FetchOutcome::failure("HTTP 500"));
}

#[tokio::test]
async fn test_single_page_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(html(
            r#"<html><head><title>Article</title></head><body>
                <p>Body</p><a href="/next">Next</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(1, 5, 1);
    let url = format!("{}/article", mock_server.uri());
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config).unwrap());

    let report = crawl_single_page_with(&config, &url, Some(dir.path()), Some(fetcher)).await;

    assert!(report.success);
    assert_eq!(report.title, "Article");
    assert_eq!(report.links_count, 1);
    let filename = report.filename.unwrap();
    assert!(dir.path().join(&filename).is_file());
    assert!(!dir.path().join(INDEX_FILE_NAME).exists());
}

#[tokio::test]
async fn test_single_page_failure() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(1, 5, 1);
    let url = format!("{}/gone", mock_server.uri());
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config).unwrap());

    let report = crawl_single_page_with(&config, &url, Some(dir.path()), Some(fetcher)).await;

    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("HTTP 404"));
    assert!(report.filename.is_none());
}

#[tokio::test]
async fn test_single_page_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("single");
    let mut config = create_test_config(1, 5, 1);
    config.crawler.page_timeout_secs = 0;
    let fetcher = Arc::new(ScriptedFetcher::new().page(SEED, &[]));

    let report = crawl_single_page_with(&config, SEED, Some(&out), Some(fetcher.clone())).await;

    assert!(!report.success);
    assert!(report.error.as_deref().unwrap().contains("page_timeout_secs"));
    assert!(fetcher.fetched().is_empty());
    assert!(!out.exists());
}
