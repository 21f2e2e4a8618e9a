//! # Spinarak Library
//!
//! Fetches web pages concurrently and counts how many times an exact word
//! appears in each page body.
//!
//! A fixed-size pool of workers shares one job queue and one result queue.
//! Every submitted link yields exactly one [`PageResult`]; fetch, status and
//! scan failures are carried on the result instead of aborting the batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spinarak_lib::{CheckConfig, PageChecker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = PageChecker::with_config(
//!         CheckConfig::default().with_word("crab").with_workers(8),
//!     )?;
//!     let links = vec!["https://www.rust-lang.org".to_string()];
//!
//!     for result in checker.check_pages(&links).await {
//!         println!("{}", result);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Streaming scan**: bodies are tokenized as they arrive, never buffered whole
//! - **Fixed worker pool**: N workers, one GET per link, no retries
//! - **Completion-order results**: batch or stream consumption
//! - **Layered configuration**: TOML files and `SPINARAK_*` environment variables

// Re-export main public API types and functions
// This makes them available as spinarak_lib::TypeName
pub use checker::PageChecker;
pub use concurrent::{ResultStream, WorkerPool};
pub use config::{
    load_env_config, ConfigManager, DefaultsConfig, EnvConfig, FileConfig, OutputConfig,
};
pub use error::SpinarakError;
pub use tokens::{count_in_bytes, count_occurrences, TokenMatcher};
pub use types::{validate_word, CheckConfig, OutputFormat, PageResult};
pub use utils::{parse_links, read_links_from_file};
pub use worker::fetch_and_count;

mod checker;
mod concurrent;
mod config;
mod error;
mod tokens;
mod types;
mod utils;
mod worker;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SpinarakError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
