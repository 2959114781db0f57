//! Error types for remote data source operations.

use thiserror::Error;

/// Errors that can occur while talking to the LCD or market-data APIs.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("unexpected status: HTTP {0}")]
    Status(u16),

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout(err.to_string())
        } else if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else {
            FeedError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

impl FeedError {
    /// Returns true if this error is transient and likely to succeed on
    /// a later poll. Parse errors are not: the upstream shape changed.
    pub fn is_transient(&self) -> bool {
        match self {
            FeedError::Http(_) | FeedError::Timeout(_) => true,
            FeedError::Status(code) => *code >= 500 || *code == 429,
            FeedError::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FeedError::Http("connection refused".into()).is_transient());
        assert!(FeedError::Timeout("deadline".into()).is_transient());
        assert!(FeedError::Status(503).is_transient());
        assert!(FeedError::Status(429).is_transient());
        assert!(!FeedError::Status(404).is_transient());
        assert!(!FeedError::Parse("bad json".into()).is_transient());
    }
}
