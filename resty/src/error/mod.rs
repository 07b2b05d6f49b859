//! Layered error types for the REST client.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`RestError`] - Top-level error type for all fallible operations
//! - [`ClientError`] - Transport, cancellation and timeout failures
//! - [`ValidationError`] - Serialization, deserialization and content-type failures
//! - [`ConfigError`] - URI, header and content-type construction errors
//! - [`ResponseError`] - The uniform error shape attached to a [`RestResponse`](crate::RestResponse)

mod client_error;
mod config_error;
mod response_error;
mod rest_error;
mod validation_error;

pub use client_error::{BoxError, ClientError};
pub use config_error::ConfigError;
pub use response_error::{ErrorKind, ResponseError};
pub use rest_error::RestError;
pub use validation_error::ValidationError;
