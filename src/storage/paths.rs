//! Deterministic names for persisted pages and run output directories

use crate::url::display_domain;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Characters that are unsafe in file names on common platforms
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Longest file stem before a digest suffix is used instead
const MAX_NAME_LEN: usize = 100;

/// Hex digits of SHA-256 kept when disambiguating truncated names
const DIGEST_LEN: usize = 12;

/// Extension of persisted page documents
pub const PAGE_EXTENSION: &str = "md";

/// Which entry point produced an output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    Website,
    Single,
}

impl CrawlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Single => "single",
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replaces unsafe characters with `_`, collapses `_` runs, trims `_` at both ends
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if UNSAFE_CHARS.contains(&c) || c.is_control() {
            '_'
        } else {
            c
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

/// Derives the page file name for a URL
///
/// Host and port, path, and query are flattened with `.` and `/` mapped to
/// `_`; the root path becomes `index`. Names longer than 100 characters are
/// cut and suffixed with a digest of the full URL so they remain distinct.
///
/// # Examples
///
/// ```
/// use tidemark::storage::filename_for_url;
///
/// assert_eq!(filename_for_url("https://docs.example.com/"), "docs_example_com_index.md");
/// assert_eq!(filename_for_url("https://docs.example.com/guide/intro.html"), "docs_example_com_guide_intro_html.md");
/// ```
pub fn filename_for_url(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => {
            let mut host = parsed.host_str().unwrap_or_default().to_lowercase();
            if let Some(port) = parsed.port() {
                host.push('_');
                host.push_str(&port.to_string());
            }
            let domain = host.replace('.', "_");

            let path = parsed.path().replace(['/', '.'], "_");
            let path = if path.trim_matches('_').is_empty() {
                "index".to_string()
            } else {
                path
            };

            match parsed.query() {
                Some(query) if !query.is_empty() => format!("{}_{}_{}", domain, path, query),
                _ => format!("{}_{}", domain, path),
            }
        }
        Err(_) => url.to_string(),
    };

    let mut name = sanitize_name(&raw);
    if name.is_empty() {
        name = "index".to_string();
    }

    if name.chars().count() > MAX_NAME_LEN {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        let keep = MAX_NAME_LEN - DIGEST_LEN - 1;
        let prefix: String = name.chars().take(keep).collect();
        name = format!("{}_{}", prefix.trim_end_matches('_'), &digest[..DIGEST_LEN]);
    }

    format!("{}.{}", name, PAGE_EXTENSION)
}

/// Derives the output directory for a crawl of `url`
///
/// Layout: `<base>/<domain>_<first path segment or "index">_<mode>`.
pub fn output_dir_for(url: &Url, mode: CrawlMode, base_dir: &Path) -> PathBuf {
    let domain = sanitize_name(&display_domain(url));
    let section = url
        .path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))
        .map(sanitize_name)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "index".to_string());

    base_dir.join(format!("{}_{}_{}", domain, section, mode))
}
