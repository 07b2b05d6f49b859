//! The uniform error shape attached to responses.

use std::fmt;

use thiserror::Error;

use super::ClientError;

/// Classification of a failed request outcome.
///
/// When several apply, the executor reports the first in declaration order:
/// cancellation, then timeout, then transport failure, then status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller aborted the request.
    Canceled,
    /// The deadline fired before the transport completed.
    TimedOut,
    /// The transport failed to produce a response.
    Transport,
    /// A response arrived with a status outside `200..300`.
    NonSuccessStatus,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Canceled => "canceled",
            Self::TimedOut => "timed out",
            Self::Transport => "transport failure",
            Self::NonSuccessStatus => "non-success status",
        };
        f.write_str(label)
    }
}

/// Error describing why a request did not succeed.
///
/// Requests that never produced an HTTP status (cancellation, timeout,
/// transport failure) carry `status: None`; [`status_code`](Self::status_code)
/// reports those as `0`.
#[derive(Debug, Error)]
#[error("{description}")]
pub struct ResponseError {
    kind: ErrorKind,
    status: Option<u16>,
    description: String,
    body: Option<String>,
    #[source]
    source: Option<ClientError>,
}

impl ResponseError {
    /// The request was aborted by the caller.
    pub fn canceled() -> Self {
        Self {
            kind: ErrorKind::Canceled,
            status: None,
            description: "Request canceled".to_string(),
            body: None,
            source: Some(ClientError::Canceled),
        }
    }

    /// The request timed out after `duration_ms` milliseconds.
    pub fn timed_out(duration_ms: u64) -> Self {
        Self {
            kind: ErrorKind::TimedOut,
            status: None,
            description: format!("Request timed out after {duration_ms}ms"),
            body: None,
            source: Some(ClientError::Timeout { duration_ms }),
        }
    }

    /// The transport failed; the cause is kept as the error source.
    pub fn transport(cause: ClientError) -> Self {
        Self {
            kind: ErrorKind::Transport,
            status: None,
            description: format!("An error occurred while sending the request: {cause}"),
            body: None,
            source: Some(cause),
        }
    }

    /// The server answered with a non-success status.
    pub fn status(status: u16, description: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NonSuccessStatus,
            status: Some(status),
            description: description.into(),
            body: None,
            source: None,
        }
    }

    /// Attaches the response body text for diagnostics.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the outcome classification.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status, or `None` when no response was received.
    pub fn status_code_opt(&self) -> Option<u16> {
        self.status
    }

    /// Returns the HTTP status, or `0` when no response was received.
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(0)
    }

    /// Returns the human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the response body captured for diagnostics, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the underlying transport cause, if any.
    pub fn cause(&self) -> Option<&ClientError> {
        self.source.as_ref()
    }
}
