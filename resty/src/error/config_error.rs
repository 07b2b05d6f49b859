//! Request construction errors.

use thiserror::Error;

/// Errors raised while building a request target or request model.
///
/// These fail fast at the call that caused them and typically indicate
/// programmer errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry a path (e.g. `mailto:` or `data:` URLs).
    #[error("Base URL cannot be a base: {url}")]
    CannotBeABase {
        /// The offending URL.
        url: String,
    },

    /// The resource URI was absolute where a relative one is required.
    #[error("Resource URI must be relative: {resource}")]
    NotRelative {
        /// The offending resource string.
        resource: String,
    },

    /// An empty or whitespace-only content type was supplied.
    #[error("Content type must not be blank")]
    EmptyContentType,

    /// A structured value was expected but a scalar or sequence was given.
    #[error("Expected a structured value with named fields, got {found}")]
    NotAnObject {
        /// Description of what was supplied instead.
        found: &'static str,
    },

    /// A header name or value was rejected.
    #[error("Invalid header {name}: {message}")]
    InvalidHeader {
        /// The header name as supplied.
        name: String,
        /// Why the header was rejected.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
