//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlTask` / `CrawlResult`: a scheduled URL and the outcome of fetching it
//! - `Frontier`: pending tasks, visited URLs, and completed results
//! - `EligibilityFilter`: decides whether a discovered link becomes a task

mod eligibility;
mod frontier;
mod task;

// Re-export main types
pub use eligibility::{EligibilityFilter, LinkDecision, RejectReason};
pub use frontier::Frontier;
pub use task::{CrawlResult, CrawlTask, InvalidResultRecord};
