//! Error types for QueryDeck.
//!
//! Defines the application error enum used by the CLI, configuration and
//! terminal layers. Transport failures against the query service have their
//! own envelope type in [`crate::api::TransportError`].

use thiserror::Error;

/// Main error type for QueryDeck operations.
#[derive(Error, Debug)]
pub enum QueryDeckError {
    /// Query service unreachable or client construction failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration errors (invalid config file, unknown server name, bad URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal setup, drawing or event polling failed.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryDeckError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a terminal error with the given message.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Config(_) => "Configuration Error",
            Self::Terminal(_) => "Terminal Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using QueryDeckError.
pub type Result<T> = std::result::Result<T, QueryDeckError>;
