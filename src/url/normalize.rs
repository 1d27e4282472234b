use crate::UrlError;
use url::Url;

/// Normalizes a URL into its crawl identity
///
/// # Normalization Steps
///
/// 1. Prefix `https://` when the input carries no http(s) scheme
/// 2. Parse the URL; reject if malformed
/// 3. Reject schemes other than http and https
/// 4. Reject URLs without a host
/// 5. Lowercase the host and resolve dot segments (done by the parser)
/// 6. Remove the fragment
///
/// Two URLs that differ only in host case or fragment normalize to the same
/// string, so they are treated as the same task.
///
/// # Examples
///
/// ```
/// use tidemark::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Docs.Example.COM/guide/../intro#setup").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/intro");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let trimmed = url_str.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        trimmed.to_string()
    } else if lowered.contains("://") {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported: {}",
            trimmed
        )));
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Checks basic well-formedness: an http(s) scheme and a host are present
pub fn is_valid_url(url_str: &str) -> bool {
    match Url::parse(url_str) {
        Ok(url) => {
            (url.scheme() == "http" || url.scheme() == "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}
