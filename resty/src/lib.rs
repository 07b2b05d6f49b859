//! A REST client built around templated URIs and pluggable payload formats.
//!
//! ## Core Types
//!
//! - [`RestUri`] - Base URL, resource template, path parameters and query string
//! - [`RestClient`] / [`RestRequest`] - Build and send a request, with timeout and cancellation
//! - [`RestResponse`] - Status, headers, cookies and a lazily buffered [`ResponseBody`]
//! - [`TypedResponse`] - A response whose body decodes to a caller-chosen type
//! - [`RestConfiguration`] - Serializers and deserializers keyed by content type
//!
//! A send always yields a [`RestResponse`]. Cancellation, timeouts, transport
//! failures and non-success statuses are recorded on
//! [`RestResponse::error`]; `Err` is reserved for requests that could not be
//! built at all.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use resty::{RestClient, RestUri};
//!
//! #[derive(serde::Deserialize, Default, Debug)]
//! struct Account { id: u64, email: String }
//!
//! # async fn run() -> Result<(), resty::RestError> {
//! let client = RestClient::new()?;
//! let uri = RestUri::with_resource("https://api.example.com/v1", "/accounts/{id}")?
//!     .set_parameter("id", 1)
//!     .set_query("expand", "profile");
//!
//! let response = client.get(uri).send_typed::<Account>().await?;
//! if response.is_success() {
//!     let account = response.data().await?;
//!     println!("{account:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod client;
pub mod config;
pub mod content_type;
pub mod error;
pub mod expand;
pub mod method;
pub mod response;
pub mod serialization;
pub mod uri;

pub use body::{ObjectBody, RequestBody};
pub use client::{
    AbortHandle, Credentials, RequestState, ReqwestTransport, RestClient, RestClientBuilder,
    RestRequest, Transport,
};
pub use config::{RequestOptions, RestConfiguration, TransportOptions};
pub use content_type::ContentType;
pub use error::{
    BoxError, ClientError, ConfigError, ErrorKind, ResponseError, RestError, ValidationError,
};
pub use method::RestMethod;
pub use response::{BodyStream, ResponseBody, ResponseCookie, RestResponse, TypedResponse};
pub use uri::{QueryValue, RestUri};
