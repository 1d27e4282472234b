//! Fetch port and its HTTP implementation
//!
//! The traversal engine only sees [`PageFetcher`]: given a URL it returns a
//! [`FetchOutcome`]. Ordinary network and content failures are reported as
//! `FetchOutcome::Failure`; an `Err` from the port is unexpected and the
//! dispatcher turns it into a failed result as well.

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::{internal_links, parse_html};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;

/// Title used when a page has none
pub const UNTITLED: &str = "Untitled";

/// Maximum redirect hops followed per fetch
const MAX_REDIRECTS: usize = 10;

/// Content extracted from a successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub title: String,
    pub content: String,
    /// Length of `content` in characters
    pub content_length: usize,
    /// Absolute same-site links found on the page
    pub internal_links: Vec<String>,
}

impl FetchedPage {
    /// Builds a page, deriving `content_length` from `content`
    pub fn new(title: impl Into<String>, content: impl Into<String>, internal_links: Vec<String>) -> Self {
        let content = content.into();
        Self {
            title: title.into(),
            content_length: content.chars().count(),
            content,
            internal_links,
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page fetched and extracted
    Success(FetchedPage),

    /// Ordinary failure (network error, timeout, non-2xx, non-HTML)
    Failure {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }
}

/// Fetch port consumed by the traversal engine
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, reporting ordinary failures as `FetchOutcome::Failure`
    async fn fetch(&self, url: &str) -> crate::Result<FetchOutcome>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Whole-request timeout for each fetch
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use tidemark::config::UserAgentConfig;
/// use tidemark::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch port backed by `reqwest` and `scraper`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher using the configured user agent and page timeout
    pub fn new(config: &Config) -> crate::Result<Self> {
        let timeout = Duration::from_secs(config.crawler.page_timeout_secs);
        Ok(Self {
            client: build_http_client(&config.user_agent, timeout)?,
        })
    }
}

/// Classifies a request error into a short failure reason
fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_redirect() {
        format!("Redirect error: {}", error)
    } else {
        error.to_string()
    }
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> crate::Result<FetchOutcome> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Ok(FetchOutcome::failure(describe_request_error(&e))),
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(FetchOutcome::failure(format!("HTTP {}", status.as_u16())));
        }

        // A missing Content-Type is given the benefit of the doubt
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html(content_type) {
                return Ok(FetchOutcome::failure(format!(
                    "Unsupported content type: {}",
                    content_type
                )));
            }
        }

        let final_url = response.url().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Ok(FetchOutcome::failure(describe_request_error(&e))),
        };

        let parsed = parse_html(&body, &final_url);
        let links = internal_links(&parsed.links, &final_url);

        Ok(FetchOutcome::Success(FetchedPage::new(
            parsed.title.unwrap_or_else(|| UNTITLED.to_string()),
            parsed.text,
            links,
        )))
    }
}
