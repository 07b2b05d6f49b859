//! Top-level error type.

use super::{ClientError, ConfigError, ResponseError, ValidationError};
use thiserror::Error;

/// Top-level error type for all fallible operations in this crate.
///
/// Request-construction problems (bad URIs, unregistered content types,
/// invalid headers) surface immediately as [`RestError`]. Transport outcomes
/// are captured on the [`RestResponse`](crate::RestResponse) instead and only
/// become a [`RestError::Response`] through
/// [`ensure_success`](crate::RestResponse::ensure_success).
///
/// ## Examples
///
/// ```rust,ignore
/// use resty::RestError;
///
/// fn handle_error(err: RestError) {
///     match err {
///         RestError::Client(e) => eprintln!("Network error: {e}"),
///         RestError::Validation(e) => eprintln!("Bad payload: {e}"),
///         RestError::Config(e) => eprintln!("Configuration error: {e}"),
///         RestError::Response(e) => eprintln!("Request failed: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum RestError {
    /// Transport-level errors (network, timeout, cancellation).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Payload encoding/decoding errors.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Request construction errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A response-level failure raised by `ensure_success`.
    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl RestError {
    /// Returns `true` if this error is the result of an unregistered content type.
    pub fn is_unsupported_content_type(&self) -> bool {
        matches!(
            self,
            Self::Validation(ValidationError::UnsupportedContentType { .. })
        )
    }
}
