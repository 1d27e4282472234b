//! Eligibility filter deciding whether a discovered link becomes a task
//!
//! Rejections are routine and silent: the caller logs them at debug level.

use crate::state::frontier::Frontier;
use crate::storage::PageStore;
use crate::url::{is_same_origin, is_valid_url, normalize_url, UrlFilters};
use std::fmt;
use url::Url;

/// Why a link was not turned into a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Missing scheme or host, or not http(s)
    Malformed,
    /// Host differs from the seed's host
    CrossOrigin,
    /// Matched an exclude pattern
    Excluded,
    /// Include patterns are configured and none matched
    NotIncluded,
    /// Already dispatched or handled
    AlreadyVisited,
    /// Already waiting in the frontier
    AlreadyPending,
    /// Accepting would overrun the page budget
    CapacityReached,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Malformed => "malformed",
            Self::CrossOrigin => "cross-origin",
            Self::Excluded => "excluded",
            Self::NotIncluded => "not included",
            Self::AlreadyVisited => "already visited",
            Self::AlreadyPending => "already pending",
            Self::CapacityReached => "page budget reserved",
        };
        f.write_str(text)
    }
}

/// Decision for one discovered link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    /// Create a task for this normalized URL
    Enqueue(String),
    /// A persisted page already exists; count the URL as handled
    AlreadyPersisted(String),
    /// Drop the link
    Rejected(RejectReason),
}

impl LinkDecision {
    pub fn is_enqueue(&self) -> bool {
        matches!(self, Self::Enqueue(_))
    }
}

/// Rule set applied to every link discovered during a run
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    seed: Url,
    filters: UrlFilters,
    max_pages: usize,
}

impl EligibilityFilter {
    pub fn new(seed: Url, filters: UrlFilters, max_pages: usize) -> Self {
        Self {
            seed,
            filters,
            max_pages,
        }
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Evaluates a link against the frontier and storage
    ///
    /// Checks run in order, first failure wins:
    /// 1. well-formed (scheme and host)
    /// 2. same origin as the seed
    /// 3. no exclude pattern matches
    /// 4. some include pattern matches, if any are configured
    /// 5. not visited (and not already pending)
    /// 6. no persisted page exists, otherwise `AlreadyPersisted`
    /// 7. `completed + pending < max_pages`
    pub fn evaluate(&self, link: &str, frontier: &Frontier, store: &dyn PageStore) -> LinkDecision {
        if !is_valid_url(link) {
            return LinkDecision::Rejected(RejectReason::Malformed);
        }
        let url = match normalize_url(link) {
            Ok(url) => url,
            Err(_) => return LinkDecision::Rejected(RejectReason::Malformed),
        };

        if !is_same_origin(&url, &self.seed) {
            return LinkDecision::Rejected(RejectReason::CrossOrigin);
        }

        let normalized = url.as_str();
        if self.filters.is_excluded(normalized) {
            return LinkDecision::Rejected(RejectReason::Excluded);
        }
        if !self.filters.is_included(normalized) {
            return LinkDecision::Rejected(RejectReason::NotIncluded);
        }

        if frontier.is_visited(normalized) {
            return LinkDecision::Rejected(RejectReason::AlreadyVisited);
        }
        if frontier.is_pending(normalized) {
            return LinkDecision::Rejected(RejectReason::AlreadyPending);
        }

        if store.exists(normalized) {
            return LinkDecision::AlreadyPersisted(normalized.to_string());
        }

        if frontier.completed_len() + frontier.pending_len() >= self.max_pages {
            return LinkDecision::Rejected(RejectReason::CapacityReached);
        }

        LinkDecision::Enqueue(normalized.to_string())
    }
}
