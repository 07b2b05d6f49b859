//! Transport and execution errors.

use thiserror::Error;

/// Boxed error used to preserve arbitrary transport causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from the transport layer.
///
/// These errors represent network-level failures, explicit cancellation and
/// timeouts that occur while a request is in flight or while its body is
/// being copied.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The `reqwest` transport reported an error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A custom transport failed; the original cause is preserved.
    #[error("Transport failed: {message}")]
    Transport {
        /// Human readable description of the failure.
        message: String,
        /// The underlying cause, when one is available.
        #[source]
        source: Option<BoxError>,
    },

    /// The request was aborted by the caller.
    #[error("Request canceled")]
    Canceled,

    /// The request did not complete before its deadline.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        duration_ms: u64,
    },
}

impl ClientError {
    /// Creates a transport error wrapping an arbitrary cause.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns `true` if this error is retryable.
    ///
    /// Retrying is always the caller's decision; this only classifies.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Canceled => false,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
        }
    }

    /// Returns the HTTP status code carried by the underlying error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
