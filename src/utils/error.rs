use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::toc::Epoch;

/// Common result type for configuration and parsing operations
pub type BoxResult<T> = Result<T, Box<dyn Error>>;

/// Error types for viewer operations
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    /// Embedded document not loaded, cross-origin, or content root missing
    ContentUnavailable(String),
    /// Activation or scroll target missing from the current content
    ElementNotFound(String),
    /// A callback fired for a generation that has been superseded
    ObserverDisposalRace {
        expected: Epoch,
        actual: Epoch,
    },
    /// Network or transport failure while fetching note content
    Fetch(String),
    /// Fetch attempt exceeded the load timeout
    Timeout(Duration),
    /// Fetch succeeded but produced no content
    EmptyContent(String),
    /// Configuration error
    Config(String),
    /// Markup could not be parsed
    Parse(String),
    /// Generic error message
    Generic(String),
}

impl ViewerError {
    /// Whether the error degrades to the "no table of contents" state
    pub fn is_content_unavailable(&self) -> bool {
        matches!(self, ViewerError::ContentUnavailable(_))
    }
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::ContentUnavailable(msg) => write!(f, "Content unavailable: {}", msg),
            ViewerError::ElementNotFound(id) => write!(f, "Heading element not found: {}", id),
            ViewerError::ObserverDisposalRace { expected, actual } => write!(
                f,
                "Stale observer callback from epoch {} (current epoch {})",
                actual, expected
            ),
            ViewerError::Fetch(msg) => write!(f, "Fetch error: {}", msg),
            ViewerError::Timeout(after) => write!(f, "Request timed out after {}ms", after.as_millis()),
            ViewerError::EmptyContent(url) => write!(f, "Empty content received from {}", url),
            ViewerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ViewerError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ViewerError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for ViewerError {}

impl From<String> for ViewerError {
    fn from(msg: String) -> Self {
        ViewerError::Generic(msg)
    }
}

impl From<&str> for ViewerError {
    fn from(msg: &str) -> Self {
        ViewerError::Generic(msg.to_string())
    }
}
