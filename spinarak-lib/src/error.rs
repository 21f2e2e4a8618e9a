//! Error handling for page fetching and word counting.
//!
//! This module defines the error type shared by the whole library. Three
//! variants describe why a single page could not be counted; they travel as
//! data inside a [`PageResult`](crate::PageResult) and never abort a batch.
//! The remaining variants cover structural problems such as bad configuration
//! or an unreadable link file.

use std::fmt;

/// Main error type for spinarak operations.
///
/// Messages are stored as strings so that results carrying an error stay
/// `Clone` and can be serialized for JSON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinarakError {
    /// The page could not be reached (connection refused, DNS failure,
    /// malformed URL, TLS failure, ...)
    FetchError {
        link: String,
        message: String,
    },

    /// A response arrived but its status was not 200 OK
    UnexpectedStatus {
        link: String,
        status: u16,
    },

    /// Reading the response body failed part way through the scan
    ScanError {
        link: String,
        message: String,
    },

    /// Configuration errors (invalid settings, unparsable files, etc.)
    ConfigError {
        message: String,
    },

    /// File I/O errors when reading link lists or config files
    FileError {
        path: String,
        message: String,
    },

    /// Input rejected before any work was started
    InvalidInput {
        message: String,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl SpinarakError {
    /// Create a new fetch error.
    pub fn fetch<L: Into<String>, M: Into<String>>(link: L, message: M) -> Self {
        Self::FetchError {
            link: link.into(),
            message: message.into(),
        }
    }

    /// Create a new unexpected status error.
    pub fn unexpected_status<L: Into<String>>(link: L, status: u16) -> Self {
        Self::UnexpectedStatus {
            link: link.into(),
            status,
        }
    }

    /// Create a new scan error.
    pub fn scan<L: Into<String>, M: Into<String>>(link: L, message: M) -> Self {
        Self::ScanError {
            link: link.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid input error.
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::FetchError { .. })
    }

    pub fn is_status_error(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { .. })
    }

    pub fn is_scan_error(&self) -> bool {
        matches!(self, Self::ScanError { .. })
    }

    /// HTTP status carried by an [`UnexpectedStatus`](Self::UnexpectedStatus) error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for SpinarakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchError { link, message } => {
                write!(f, "Fetch failed for '{}': {}", link, message)
            }
            Self::UnexpectedStatus { link, status } => {
                write!(f, "Unexpected HTTP status {} from '{}'", status, link)
            }
            Self::ScanError { link, message } => {
                write!(f, "Scan of '{}' stopped early: {}", link, message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for SpinarakError {}

// Conversions for the structural paths. Per-page failures are built with the
// link-aware constructors above instead.
impl From<reqwest::Error> for SpinarakError {
    fn from(err: reqwest::Error) -> Self {
        let link = err.url().map(|u| u.to_string()).unwrap_or_default();
        Self::fetch(link, err.to_string())
    }
}

impl From<std::io::Error> for SpinarakError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for SpinarakError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
