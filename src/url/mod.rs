//! URL handling module for Tidemark
//!
//! This module provides URL normalization, well-formedness checks, the
//! same-origin rule, and include/exclude link filters.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{display_domain, extract_host, is_same_origin};
pub use filter::UrlFilters;
pub use normalize::{is_valid_url, normalize_url};
