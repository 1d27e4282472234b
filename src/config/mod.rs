//! Configuration module for Tidemark
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to the crawler defaults.
//!
//! # Example
//!
//! ```no_run
//! use tidemark::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tidemark.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FilterConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
