//! HTML parser for extracting links, title and visible text
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title
//! - Visible body text used as the stored page content

use crate::url::is_same_origin;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never counts as page content
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All links found on the page (absolute http(s) URLs)
    pub links: Vec<String>,

    /// Visible body text, whitespace-collapsed
    pub text: String,
}

/// Parses HTML content and extracts links, title and text
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
///
/// A failure while extracting links is not an error for the page: it is
/// logged and the page is treated as having no links.
///
/// # Example
///
/// ```
/// use tidemark::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let links = match extract_links(&document, base_url) {
        Ok(links) => links,
        Err(e) => {
            tracing::debug!("Link extraction failed for {}: {}", base_url, e);
            Vec::new()
        }
    };

    ParsedPage {
        title: extract_title(&document),
        links,
        text: extract_text(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<Vec<_>>().join(" "))
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
}

/// Collects visible text under <body>, skipping script-like elements
fn extract_text(document: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut words: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| SKIPPED_TAGS.contains(&element.name()))
                .unwrap_or(false)
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Result<Vec<String>, String> {
    let mut links = Vec::new();

    let a_selector = Selector::parse("a[href]").map_err(|e| e.to_string())?;
    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }
        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            links.push(absolute_url);
        }
    }

    let canonical_selector =
        Selector::parse("link[rel='canonical'][href]").map_err(|e| e.to_string())?;
    for element in document.select(&canonical_selector) {
        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            links.push(absolute_url);
        }
    }

    Ok(links)
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None for special schemes, fragment-only and unresolvable links.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}

/// Keeps the links that stay on the page's own host
///
/// Fragments are dropped and duplicates removed, keeping first-seen order.
pub fn internal_links(links: &[String], page_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut internal = Vec::new();

    for link in links {
        let Ok(mut parsed) = Url::parse(link) else {
            continue;
        };
        if !is_same_origin(&parsed, page_url) {
            continue;
        }
        parsed.set_fragment(None);
        let link = parsed.to_string();
        if seen.insert(link.clone()) {
            internal.push(link);
        }
    }

    internal
}
