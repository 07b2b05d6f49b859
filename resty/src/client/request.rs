//! Request model and execution.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, REFERER, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn, Span};
use url::Url;

use super::abort::{AbortHandle, RequestState};
use super::transport::{Credentials, Transport, TransportRequest, TransportResponse};
use crate::body::RequestBody;
use crate::config::{RequestOptions, RestConfiguration};
use crate::content_type::ContentType;
use crate::error::{ClientError, ConfigError, ResponseError, RestError};
use crate::expand::{expand, Expanded};
use crate::method::RestMethod;
use crate::response::{RestResponse, TypedResponse};
use crate::uri::RestUri;

enum Outcome {
    Canceled,
    TimedOut(Duration),
    Sent(Result<TransportResponse, ClientError>),
}

/// A single request: target, headers, credentials, body and options.
///
/// Created by [`RestClient::request`](crate::RestClient::request) and the
/// per-method shortcuts, configured with chained calls and consumed by one of
/// the `send` methods.
///
/// Sending only fails for problems with the request itself (a URI that does
/// not render, a body with no registered serializer). Everything that happens
/// on the wire, from connection failures to `500`s, is reported through
/// [`RestResponse::error`].
///
/// ## Examples
///
/// ```rust,ignore
/// use resty::{ContentType, RestClient, RestUri};
///
/// let client = RestClient::new()?;
/// let uri = RestUri::with_resource("https://api.example.com/", "accounts/{id}")?
///     .set_parameter("id", 42);
///
/// let response = client
///     .put(uri)
///     .content_type(ContentType::APPLICATION_JSON)
///     .object_body(&account)?
///     .bearer_auth("sk-xxx")
///     .send()
///     .await?
///     .ensure_success()
///     .await?;
/// ```
#[derive(Debug)]
pub struct RestRequest<T> {
    transport: Arc<T>,
    config: Arc<RestConfiguration>,
    method: RestMethod,
    uri: RestUri,
    options: RequestOptions,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
    credentials: Option<Credentials>,
    body: Option<RequestBody>,
    abort: AbortHandle,
}

impl<T: Transport> RestRequest<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        config: Arc<RestConfiguration>,
        options: RequestOptions,
        method: RestMethod,
        uri: RestUri,
    ) -> Self {
        Self {
            transport,
            config,
            method,
            uri,
            options,
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            credentials: None,
            body: None,
            abort: AbortHandle::default(),
        }
    }

    /// Adds a header, keeping earlier values under the same name.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] for an invalid name or value.
    pub fn add_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, RestError> {
        let name_ref = name.as_ref();
        let header_name = HeaderName::try_from(name_ref)
            .map_err(|e| ConfigError::invalid_header(name_ref, e))?;
        let header_value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| ConfigError::invalid_header(name_ref, e))?;
        self.headers.append(header_name, header_value);
        Ok(self)
    }

    /// Adds every named field of `headers` as a header.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] for scalars, or the error from
    /// [`add_header`](Self::add_header).
    pub fn add_headers<H: Serialize + ?Sized>(mut self, headers: &H) -> Result<Self, RestError> {
        match expand(headers)? {
            Expanded::Pairs(pairs) => {
                for (name, value) in pairs {
                    self = self.add_header(name, value)?;
                }
                Ok(self)
            }
            Expanded::Scalar(_) => Err(ConfigError::NotAnObject { found: "a scalar" }.into()),
        }
    }

    /// Adds a cookie to the `Cookie` header.
    pub fn add_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Authenticates with HTTP basic credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some(Credentials::Basic {
            username: username.into(),
            password,
        });
        self
    }

    /// Authenticates with a bearer token.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Bearer(token.into()));
        self
    }

    /// Sets the request body.
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a structured body, encoded by the serializer registered for the
    /// request's content type when sent.
    ///
    /// ## Errors
    ///
    /// Returns a validation error if the value cannot be captured.
    pub fn object_body<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, RestError> {
        Ok(self.body(RequestBody::object(body)?))
    }

    /// Sets the content type used for the body.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.options = self.options.content_type(content_type);
        self
    }

    /// Sets the timeout raced against the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.timeout(timeout);
        self
    }

    /// Disables the timeout.
    pub fn no_timeout(mut self) -> Self {
        self.options = self.options.no_timeout();
        self
    }

    /// Sets the `User-Agent` sent unless a header of that name was added.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options = self.options.user_agent(user_agent);
        self
    }

    /// Sets the `Referer` sent unless a header of that name was added.
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.options = self.options.referer(referer);
        self
    }

    /// Returns a handle that can cancel this request once it is sent.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// Returns the request target.
    pub fn uri(&self) -> &RestUri {
        &self.uri
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> RequestState {
        self.abort.state()
    }

    /// Sends the request.
    ///
    /// Cancellation, the timeout and the transport race each other; when more
    /// than one is ready at once, cancellation wins over the timeout, which
    /// wins over the transport result.
    ///
    /// ## Errors
    ///
    /// Returns an error only if the request cannot be built: an invalid URL,
    /// header or body. Transport outcomes are in [`RestResponse::error`].
    #[instrument(
        name = "rest_request",
        skip(self),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn send(self) -> Result<RestResponse, RestError> {
        Span::current().record("http.method", self.method.as_str());
        let url = self.uri.to_url()?;
        Span::current().record("http.url", url.as_str());

        let request = self.transport_request(url.clone())?;
        let token = self.abort.begin();
        let deadline = self.options.timeout;

        let timer = async {
            match deadline {
                Some(duration) => {
                    tokio::time::sleep(duration).await;
                    duration
                }
                None => std::future::pending::<Duration>().await,
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Outcome::Canceled,
            elapsed = timer => Outcome::TimedOut(elapsed),
            result = self.transport.send(request) => Outcome::Sent(result),
        };

        let response = match outcome {
            Outcome::Canceled => {
                debug!("request canceled");
                self.abort.finish(RequestState::Canceled);
                Span::current().record("otel.status_code", "ERROR");
                RestResponse::failed(self.method, Some(url), ResponseError::canceled())
            }
            Outcome::TimedOut(elapsed) => {
                let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                warn!(duration_ms, "request timed out");
                self.abort.finish(RequestState::TimedOut);
                Span::current().record("otel.status_code", "ERROR");
                RestResponse::failed(self.method, Some(url), ResponseError::timed_out(duration_ms))
            }
            Outcome::Sent(Err(error)) => {
                warn!(error = %error, "request failed");
                self.abort.finish(RequestState::Faulted);
                Span::current().record("otel.status_code", "ERROR");
                RestResponse::failed(self.method, Some(url), ResponseError::transport(error))
            }
            Outcome::Sent(Ok(received)) => {
                Span::current().record("http.status_code", received.status);
                let otel_status = match received.status {
                    200..=299 => "OK",
                    500..=599 => "ERROR",
                    _ => "UNSET",
                };
                Span::current().record("otel.status_code", otel_status);
                self.abort.finish(RequestState::Completed);
                RestResponse::from_transport(self.method, received)
            }
        };

        Ok(response)
    }

    /// Sends the request and wraps the response for typed decoding.
    ///
    /// ## Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_typed<D: DeserializeOwned + Default>(
        self,
    ) -> Result<TypedResponse<D>, RestError> {
        let config = Arc::clone(&self.config);
        let response = self.send().await?;
        Ok(TypedResponse::new(response, config))
    }

    /// Sends the request from synchronous code.
    ///
    /// Drives the request on a private single-threaded runtime and buffers
    /// the body before returning, so the response can be read without one.
    /// Panics if called from within an async runtime.
    ///
    /// ## Errors
    ///
    /// See [`send`](Self::send); also fails if the runtime cannot start.
    pub fn send_blocking(self) -> Result<RestResponse, RestError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::transport("failed to start blocking runtime", e))?;

        runtime.block_on(async {
            let response = self.send().await?;
            response.body().read_as_bytes().await;
            Ok(response)
        })
    }

    /// Blocking form of [`send_typed`](Self::send_typed).
    ///
    /// ## Errors
    ///
    /// See [`send_blocking`](Self::send_blocking).
    pub fn send_typed_blocking<D: DeserializeOwned + Default>(
        self,
    ) -> Result<TypedResponse<D>, RestError> {
        let config = Arc::clone(&self.config);
        let response = self.send_blocking()?;
        Ok(TypedResponse::new(response, config))
    }

    fn transport_request(&self, url: Url) -> Result<TransportRequest, RestError> {
        let mut headers = self.headers.clone();

        // Explicitly added headers take precedence over the option defaults.
        if !headers.contains_key(USER_AGENT) {
            let user_agent = HeaderValue::try_from(self.options.user_agent.as_str())
                .map_err(|e| ConfigError::invalid_header(USER_AGENT.as_str(), e))?;
            headers.insert(USER_AGENT, user_agent);
        }

        if let Some(referer) = &self.options.referer {
            if !headers.contains_key(REFERER) {
                let referer = HeaderValue::try_from(referer.as_str())
                    .map_err(|e| ConfigError::invalid_header(REFERER.as_str(), e))?;
                headers.insert(REFERER, referer);
            }
        }

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let cookie = HeaderValue::try_from(cookie)
                .map_err(|e| ConfigError::invalid_header(COOKIE.as_str(), e))?;
            headers.insert(COOKIE, cookie);
        }

        let body = match &self.body {
            Some(body) => {
                let content_type = &self.options.content_type;
                let bytes = body.render_bytes(content_type, &self.config)?;
                if !headers.contains_key(CONTENT_TYPE) {
                    let value = HeaderValue::try_from(content_type.as_str())
                        .map_err(|e| ConfigError::invalid_header(CONTENT_TYPE.as_str(), e))?;
                    headers.insert(CONTENT_TYPE, value);
                }
                debug!(bytes = bytes.len(), content_type = %content_type, "rendered request body");
                Some(bytes)
            }
            None => None,
        };

        Ok(TransportRequest {
            method: self.method,
            url,
            headers,
            body,
            credentials: self.credentials.clone(),
        })
    }
}
