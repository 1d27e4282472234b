use serde::Deserialize;

/// Main configuration structure for Tidemark
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub filters: FilterConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth to follow from the seed URL (seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Nominal cap on the number of pages crawled in one run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum number of fetches in flight at once (also the batch size)
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Polite delay applied after every fetch (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Timeout for a single page fetch (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Persist a checkpoint after every batch, not only at run end
    #[serde(rename = "checkpoint-every-batch")]
    pub checkpoint_every_batch: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 50,
            max_concurrent: 5,
            delay_ms: 1000,
            page_timeout_secs: 30,
            checkpoint_every_batch: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "tidemark".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/tidemark-crawler/tidemark".to_string(),
            contact_email: "crawler@tidemark.dev".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory under which per-run output directories are derived
    #[serde(rename = "base-dir")]
    pub base_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: "output".to_string(),
        }
    }
}

/// Substring filters applied to discovered links
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// A link must contain at least one of these (when non-empty)
    pub include: Vec<String>,

    /// A link containing any of these is never crawled
    pub exclude: Vec<String>,
}
