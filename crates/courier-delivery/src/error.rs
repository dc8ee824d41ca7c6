//! Error types for message delivery operations.
//!
//! Causes are categorized so the retry scheduler can distinguish transient
//! delivery failures, which are re-queued, from configuration or internal
//! errors, which terminate a task without retry.

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Error types for message delivery operations.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// Network-level connectivity failure.
    #[error("network connection failed: {message}")]
    Network {
        /// Error message describing the network failure
        message: String,
    },

    /// HTTP request timeout exceeded.
    #[error("request timeout after {timeout_seconds}s")]
    Timeout {
        /// Number of seconds before the request timed out
        timeout_seconds: u64,
    },

    /// HTTP response with a non-success status.
    #[error("unexpected response: HTTP {status_code}")]
    Status {
        /// HTTP status code returned by the destination
        status_code: u16,
        /// Response body content, truncated
        body: String,
    },

    /// Invalid destination or client configuration.
    #[error("invalid delivery configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// Unexpected internal error.
    #[error("internal delivery error: {message}")]
    Internal {
        /// Internal error message
        message: String,
    },
}

impl DeliveryError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates a status error from an HTTP response.
    pub fn status(status_code: u16, body: impl Into<String>) -> Self {
        Self::Status { status_code, body: body.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Determines if this error is a transient delivery failure.
    ///
    /// Network errors, timeouts, and non-success responses are all
    /// transient: the destination may recover, so the message is
    /// re-queued up to the attempt ceiling. Configuration and internal
    /// errors bypass the retry path entirely.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Status { .. } => true,
            Self::Configuration { .. } | Self::Internal { .. } => false,
        }
    }
}
