// src/error.rs

//! Unified error handling for the feed synchronizer.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for synchronizer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Network, timeout or HTTP status failure for a page
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Malformed or unexpected page structure
    #[error("Parse failed for {url}: {message}")]
    Parse { url: String, message: String },

    /// Dedup state could not be read or written
    #[error("State I/O error at {path}: {message}")]
    StateIo { path: String, message: String },

    /// Feed document could not be read or written
    #[error("Feed I/O error at {path}: {message}")]
    FeedIo { path: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client failure outside a page fetch
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regular expression failed to compile
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error for a URL.
    pub fn parse(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a state I/O error.
    pub fn state_io(path: &Path, message: impl fmt::Display) -> Self {
        Self::StateIo {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a feed I/O error.
    pub fn feed_io(path: &Path, message: impl fmt::Display) -> Self {
        Self::FeedIo {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short failure kind used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } | Self::Http(_) => "fetch",
            Self::Parse { .. } | Self::Selector { .. } => "parse",
            Self::StateIo { .. } => "state-io",
            Self::FeedIo { .. } => "feed-io",
            Self::Config(_) | Self::Validation(_) => "config",
            _ => "other",
        }
    }
}
