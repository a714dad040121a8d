//! Configuration module for Job-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use job_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will request {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, OutputConfig, SelectorConfig, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, read_config};

pub use validation::{validate, validate_crawl_config};
pub(crate) use validation::compile_selector;
