//! Core data types for page word counting.
//!
//! This module defines the per-page result, the checker configuration and
//! the output format selector shared with the CLI.

use crate::error::SpinarakError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Outcome of fetching one page and counting the target word in it.
///
/// Exactly one `PageResult` is produced for every link submitted. When
/// `error` is `None`, `count` is the exact number of matches. When `error` is
/// set, `count` is 0, except for a scan error where it holds the matches seen
/// before the body read failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    /// The link that was fetched, exactly as submitted
    pub link: String,

    /// Number of whitespace-delimited tokens equal to the target word
    pub count: u64,

    /// Why the page could not be fully counted, if it couldn't
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<SpinarakError>,
}

impl PageResult {
    /// A fully counted page.
    pub fn counted<L: Into<String>>(link: L, count: u64) -> Self {
        Self {
            link: link.into(),
            count,
            error: None,
        }
    }

    /// A page that failed before any counting happened.
    pub fn failed<L: Into<String>>(link: L, error: SpinarakError) -> Self {
        Self {
            link: link.into(),
            count: 0,
            error: Some(error),
        }
    }

    /// A page whose body scan stopped early; `count` is the partial tally.
    pub fn partial<L: Into<String>>(link: L, count: u64, error: SpinarakError) -> Self {
        Self {
            link: link.into(),
            count,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for PageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\tcount: {}\n\terror: ", self.link, self.count)?;
        match &self.error {
            Some(err) => write!(f, "{}", err),
            None => write!(f, "<nil>"),
        }
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<SpinarakError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Configuration options for a checking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// The exact, case-sensitive word to count.
    /// Must be set before a run; typically supplied by the CLI or config file.
    pub word: Option<String>,

    /// Number of concurrent fetch workers
    /// Default: 1, Minimum: 1
    pub workers: usize,

    /// User-Agent header sent with every request
    /// Default: None (reqwest's default)
    pub user_agent: Option<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            word: None,
            workers: 1,
            user_agent: None,
        }
    }
}

impl CheckConfig {
    /// Set the target word.
    pub fn with_word<W: Into<String>>(mut self, word: W) -> Self {
        self.word = Some(word.into());
        self
    }

    /// Set the number of workers.
    ///
    /// Zero is raised to one so a misconfigured pool can never stall.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set a custom User-Agent header.
    pub fn with_user_agent<U: Into<String>>(mut self, user_agent: U) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), SpinarakError> {
        match self.word.as_deref() {
            None => return Err(SpinarakError::config("Need a word to process")),
            Some(word) => validate_word(word)?,
        }

        if self.workers < 1 {
            return Err(SpinarakError::config(
                "Number of workers must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Reject words that could never match a whitespace-delimited token.
pub fn validate_word(word: &str) -> Result<(), SpinarakError> {
    if word.is_empty() {
        return Err(SpinarakError::config("Need a word to process"));
    }
    if word.chars().any(char::is_whitespace) {
        return Err(SpinarakError::config(format!(
            "Word '{}' contains whitespace and can never match a token",
            word
        )));
    }
    Ok(())
}

/// How the CLI renders results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One block per page, printed as each page completes
    #[default]
    Text,

    /// A single JSON array printed after all pages complete
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = SpinarakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(SpinarakError::config(format!(
                "Unknown output format '{}', use 'text' or 'json'",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_error() {
        let result = PageResult::counted("http://example.com", 3);
        assert_eq!(
            result.to_string(),
            "http://example.com\n\tcount: 3\n\terror: <nil>"
        );
    }

    #[test]
    fn test_display_with_error() {
        let result = PageResult::failed(
            "http://example.com/x",
            SpinarakError::unexpected_status("http://example.com/x", 404),
        );
        let text = result.to_string();
        assert!(text.starts_with("http://example.com/x\n\tcount: 0\n\terror: "));
        assert!(text.contains("404"));
        assert!(!result.is_success());
    }

    #[test]
    fn test_serializes_error_as_string() {
        let ok = serde_json::to_value(PageResult::counted("http://a", 2)).unwrap();
        assert_eq!(ok["count"], 2);
        assert!(ok["error"].is_null());

        let failed = serde_json::to_value(PageResult::failed(
            "http://b",
            SpinarakError::fetch("http://b", "connection refused"),
        ))
        .unwrap();
        assert!(failed["error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[test]
    fn test_with_workers_never_zero() {
        assert_eq!(CheckConfig::default().with_workers(0).workers, 1);
        assert_eq!(CheckConfig::default().with_workers(8).workers, 8);
    }

    #[test]
    fn test_validate() {
        assert!(CheckConfig::default().validate().is_err());
        assert!(CheckConfig::default().with_word("").validate().is_err());
        assert!(CheckConfig::default().with_word("two words").validate().is_err());
        assert!(CheckConfig::default().with_word("cat").validate().is_ok());

        let mut config = CheckConfig::default().with_word("cat");
        config.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
