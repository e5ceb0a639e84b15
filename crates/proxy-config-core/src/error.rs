//! Error types for the configuration watcher
//!
//! Two families matter to the poll loop: source errors (the document could not
//! be fetched) and parse errors (the document was fetched but is not a valid
//! snapshot). Neither is fatal; both are logged and retried on the next cycle.

use thiserror::Error;

/// Result type alias for watcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the configuration watcher
#[derive(Error, Debug)]
pub enum Error {
    /// Local I/O failure while reading a source
    #[error("Source I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-I/O source failure (remote status, unavailable backend, ...)
    #[error("Source error: {0}")]
    Source(String),

    /// The document is not valid JSON or does not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document decoded but violates a structural rule
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown source type
    #[error("Not found: {0}")]
    NotFound(String),

    /// Every consumer of an outbound family has gone away
    #[error("Update channel closed: {0}")]
    ChannelClosed(&'static str),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a non-I/O source error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create an invalid document error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// True for errors raised while turning bytes into a snapshot
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Json(_) | Self::InvalidDocument(_))
    }

    /// True for errors raised while fetching bytes from a source
    pub fn is_source_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Source(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_error_families() {
        let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.is_source_error());
        assert!(!io.is_parse_error());

        let json = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        assert!(Error::from(json).is_parse_error());
        assert!(Error::invalid_document("dup").is_parse_error());
        assert!(!Error::config("bad").is_parse_error());
        assert!(!Error::ChannelClosed("services").is_source_error());
    }
}
