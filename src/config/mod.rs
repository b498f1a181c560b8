//! Configuration module for Book Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use book_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Fetching up to {} books", config.fetch.target_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, CleaningConfig, Config, DatabaseConfig, FetchConfig, OutputConfig, OutputSchema,
    QueryPolicy, RateLimitPolicy,
};
pub use validation::{MAX_PAGE_SIZE, MAX_START_INDEX};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, resolve_api_key};
