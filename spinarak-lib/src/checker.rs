//! Main page checker implementation.
//!
//! This module provides the `PageChecker` struct, the public entry point that
//! ties a validated configuration and a shared HTTP client to the worker pool.

use crate::concurrent::{ResultStream, WorkerPool};
use crate::error::SpinarakError;
use crate::types::{CheckConfig, PageResult};
use crate::worker::fetch_and_count;

/// Counts a word across web pages.
///
/// The `PageChecker` handles:
/// - Building one HTTP client shared by every worker
/// - Running a fixed-size worker pool per batch
/// - Returning per-page results with errors carried as data
///
/// # Example
///
/// ```rust,no_run
/// use spinarak_lib::{CheckConfig, PageChecker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = CheckConfig::default().with_word("rust").with_workers(4);
///     let checker = PageChecker::with_config(config)?;
///
///     let links = vec![
///         "https://www.rust-lang.org".to_string(),
///         "https://doc.rust-lang.org".to_string(),
///     ];
///     for result in checker.check_pages(&links).await {
///         println!("{}", result);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PageChecker {
    /// Configuration settings for this checker instance
    config: CheckConfig,
    /// Target word, resolved from the config at construction
    word: String,
    /// HTTP client shared by all workers
    client: reqwest::Client,
}

impl PageChecker {
    /// Create a checker for `word` with default settings (one worker).
    pub fn new<W: Into<String>>(word: W) -> Result<Self, SpinarakError> {
        Self::with_config(CheckConfig::default().with_word(word))
    }

    /// Create a checker with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns `SpinarakError::ConfigError` if the configuration has no usable
    /// word or no workers, and `SpinarakError::Internal` if the HTTP client
    /// cannot be built.
    pub fn with_config(config: CheckConfig) -> Result<Self, SpinarakError> {
        config.validate()?;
        let word = config.word.clone().unwrap_or_default();
        let client = build_client(&config)?;

        Ok(Self {
            config,
            word,
            client,
        })
    }

    /// Fetch a single page and count the word in it.
    pub async fn check_page(&self, link: &str) -> PageResult {
        fetch_and_count(&self.client, &self.word, link).await
    }

    /// Check every link with the configured number of workers.
    ///
    /// Returns exactly one result per link, in completion order.
    pub async fn check_pages(&self, links: &[String]) -> Vec<PageResult> {
        self.pool().run(links).await
    }

    /// Check every link, yielding results as they complete.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use futures_util::StreamExt;
    /// use spinarak_lib::PageChecker;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let checker = PageChecker::new("rust")?;
    ///     let links = vec!["https://www.rust-lang.org".to_string()];
    ///
    ///     let mut stream = checker.check_pages_stream(&links);
    ///     while let Some(result) = stream.next().await {
    ///         println!("{}: {}", result.link, result.count);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn check_pages_stream(&self, links: &[String]) -> ResultStream {
        self.pool().spawn(links)
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// The word being counted.
    pub fn word(&self) -> &str {
        &self.word
    }

    fn pool(&self) -> WorkerPool {
        WorkerPool::new(self.client.clone(), &self.word, self.config.workers)
    }
}

fn build_client(config: &CheckConfig) -> Result<reqwest::Client, SpinarakError> {
    let mut builder = reqwest::Client::builder();
    if let Some(agent) = &config.user_agent {
        builder = builder.user_agent(agent.as_str());
    }
    builder.build().map_err(|e| {
        SpinarakError::internal(format!("Failed to create HTTP client: {}", e))
    })
}
