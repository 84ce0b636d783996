//! Error types for the GSLB system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for GSLB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the GSLB system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors, detected at load time and always fatal
    #[error("configuration error: {0}")]
    Config(String),

    /// DNS record gateway errors
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Probe errors
    #[error("probe error: {0}")]
    Probe(String),

    /// Notifier delivery errors
    #[error("notifier error: {0}")]
    Notifier(String),

    /// Network-related errors
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication errors against a provider API
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors from a provider API
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),

    /// Gateway-specific error carrying the provider name
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a gateway error
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Create a probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Create a notifier error
    pub fn notifier(msg: impl Into<String>) -> Self {
        Self::Notifier(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
