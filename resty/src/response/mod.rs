//! Responses and their payloads.
//!
//! Every send produces a [`RestResponse`], even when nothing came back from
//! the server. Failures are described by [`RestResponse::error`] rather than
//! returned, so a caller can inspect status, headers and body after the fact
//! or opt into strictness with [`RestResponse::ensure_success`].

mod body;
mod cookie;
mod typed;

use reqwest::header::{
    HeaderMap, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, SERVER, SET_COOKIE,
};
use reqwest::{StatusCode, Version};
use url::Url;

use crate::client::TransportResponse;
use crate::content_type::parameter_of;
use crate::error::{RestError, ResponseError};
use crate::method::RestMethod;

pub use body::{BodyStream, ResponseBody};
pub use cookie::ResponseCookie;
pub use typed::TypedResponse;

/// The outcome of a request.
#[derive(Debug)]
pub struct RestResponse {
    method: RestMethod,
    url: Option<Url>,
    status: Option<u16>,
    description: String,
    version: Option<Version>,
    headers: HeaderMap,
    cookies: Vec<ResponseCookie>,
    body: ResponseBody,
    error: Option<ResponseError>,
}

impl RestResponse {
    /// Builds a response from what the transport received.
    ///
    /// A status outside `200..300` records a
    /// [`NonSuccessStatus`](crate::ErrorKind::NonSuccessStatus) error.
    pub fn from_transport(method: RestMethod, response: TransportResponse) -> Self {
        let description = StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default()
            .to_string();

        let cookies = response
            .headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(ResponseCookie::parse)
            .collect();

        let charset = response
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| parameter_of(value, "charset"))
            .map(str::to_string);

        let error = if (200..300).contains(&response.status) {
            None
        } else {
            Some(ResponseError::status(
                response.status,
                format!(
                    "Response status code does not indicate success: {} ({description})",
                    response.status
                ),
            ))
        };

        Self {
            method,
            url: Some(response.url),
            status: Some(response.status),
            description,
            version: Some(response.version),
            headers: response.headers,
            cookies,
            body: ResponseBody::new(response.body, charset),
            error,
        }
    }

    /// Builds a response for a request that produced no HTTP status.
    pub fn failed(method: RestMethod, url: Option<Url>, error: ResponseError) -> Self {
        Self {
            method,
            url,
            status: None,
            description: error.description().to_string(),
            version: None,
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            body: ResponseBody::empty(),
            error: Some(error),
        }
    }

    /// Returns `true` if the status is in `200..300`.
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }

    /// Returns the HTTP status, or `None` if no response arrived.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the HTTP status, or `0` if no response arrived.
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(0)
    }

    /// Returns the reason phrase, or the failure description for requests
    /// that produced no status.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the method the request was sent with.
    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// Returns the final URL, after redirects.
    pub fn response_url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Returns the HTTP protocol version.
    pub fn protocol_version(&self) -> Option<Version> {
        self.version
    }

    /// Returns all response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of a header, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the declared `Content-Type`, including parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Returns the declared `Content-Length`.
    pub fn content_length(&self) -> Option<u64> {
        self.header(CONTENT_LENGTH.as_str())
            .and_then(|value| value.trim().parse().ok())
    }

    /// Returns the declared `Content-Encoding`.
    ///
    /// Encodings the transport decodes itself (gzip, deflate) are removed
    /// from the headers along with the compression.
    pub fn content_encoding(&self) -> Option<&str> {
        self.header(CONTENT_ENCODING.as_str())
    }

    /// Returns the `Last-Modified` header as sent, an HTTP date.
    pub fn last_modified(&self) -> Option<&str> {
        self.header(LAST_MODIFIED.as_str())
    }

    /// Returns the `Server` header.
    pub fn server(&self) -> Option<&str> {
        self.header(SERVER.as_str())
    }

    /// Returns the charset parameter of the `Content-Type`.
    pub fn charset(&self) -> Option<&str> {
        self.body.charset()
    }

    /// Returns cookies parsed from `Set-Cookie`, in arrival order.
    pub fn cookies(&self) -> &[ResponseCookie] {
        &self.cookies
    }

    /// Returns the last cookie set under `name`.
    pub fn cookie(&self, name: &str) -> Option<&ResponseCookie> {
        self.cookies.iter().rev().find(|cookie| cookie.name() == name)
    }

    /// Returns the lazily buffered body.
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Returns why the request did not succeed, if it did not.
    pub fn error(&self) -> Option<&ResponseError> {
        self.error.as_ref()
    }

    /// Returns the response, or its error with the body text attached.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Response`] for cancellation, timeout, transport
    /// failure and non-success statuses.
    pub async fn ensure_success(mut self) -> Result<Self, RestError> {
        match self.error.take() {
            None => Ok(self),
            Some(error) => {
                let body = self.body.read_as_string().await;
                if body.is_empty() {
                    Err(error.into())
                } else {
                    Err(error.with_body(body).into())
                }
            }
        }
    }
}
