use url::Url;

/// Extracts the lowercase host from a URL
///
/// Returns None for URLs without a host (e.g. `data:` or `mailto:` URLs).
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Same-origin check used to keep a crawl inside one site
///
/// Hosts are compared case-insensitively and exactly: `www.example.com` and
/// `example.com` are different origins, as are different explicit ports.
pub fn is_same_origin(link: &Url, seed: &Url) -> bool {
    match (link.host_str(), seed.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b) && link.port() == seed.port(),
        _ => false,
    }
}

/// Host used when deriving output names: lowercased, leading `www.` removed
pub fn display_domain(url: &Url) -> String {
    let host = extract_host(url).unwrap_or_default();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}
