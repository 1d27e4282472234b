use crate::config::FilterConfig;

/// Include/exclude substring filters for discovered links
///
/// Exclusion always wins: a link matching both lists is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlFilters {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl UrlFilters {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Returns true if the link contains any exclude pattern
    pub fn is_excluded(&self, link: &str) -> bool {
        self.exclude.iter().any(|pattern| link.contains(pattern.as_str()))
    }

    /// Returns true if no include patterns are configured or the link contains one
    pub fn is_included(&self, link: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|pattern| link.contains(pattern.as_str()))
    }

    /// Applies both filters, exclude first
    #[cfg(test)]
    pub fn allows(&self, link: &str) -> bool {
        !self.is_excluded(link) && self.is_included(link)
    }
}

impl From<&FilterConfig> for UrlFilters {
    fn from(config: &FilterConfig) -> Self {
        Self::new(config.include.clone(), config.exclude.clone())
    }
}
