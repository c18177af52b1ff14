//! # Error Types Module
//!
//! Errors raised by the search provider and by the navigation layer.
//! Navigation errors never reach the transport: `Navigator::step` turns each
//! of them into a screen the user can see.

use thiserror::Error;

/// Failure of the external search call
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or connection failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// Provider answered with a non-success HTTP status
    #[error("Provider returned status {0}")]
    Status(u16),
    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SearchError::Status(status.as_u16())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

/// Errors of the navigation state machine
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Query was empty after trimming; the provider is not called
    #[error("Search query is empty")]
    EmptyQuery,
    /// The search provider failed
    #[error("Search provider failed: {0}")]
    Provider(#[from] SearchError),
    /// Button data could not be decoded or its payload is no longer cached
    #[error("Stale payload: {0}")]
    StalePayload(String),
    /// Selection does not match the data carried by the payload
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        assert_eq!(
            SearchError::Status(503).to_string(),
            "Provider returned status 503"
        );
        assert_eq!(
            NavigationError::StalePayload("unknown token".to_string()).to_string(),
            "Stale payload: unknown token"
        );
        let provider: NavigationError = SearchError::Transport("refused".to_string()).into();
        assert_eq!(
            provider.to_string(),
            "Search provider failed: Transport error: refused"
        );
    }
}
