//! The client that creates requests.
//!
//! [`RestClient`] bundles a transport, the shared [`RestConfiguration`] and
//! default [`RequestOptions`], and stamps them onto every [`RestRequest`] it
//! creates.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::request::RestRequest;
use super::transport::{ReqwestTransport, Transport};
use crate::config::{RequestOptions, RestConfiguration, TransportOptions};
use crate::content_type::ContentType;
use crate::error::RestError;
use crate::method::RestMethod;
use crate::uri::RestUri;

/// Builder for configuring a [`RestClient`].
#[derive(Debug, Default)]
pub struct RestClientBuilder {
    config: Option<Arc<RestConfiguration>>,
    options: RequestOptions,
    transport: TransportOptions,
}

impl RestClientBuilder {
    /// Uses `config` instead of [`RestConfiguration::default`].
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// let mut config = RestConfiguration::default();
    /// config.register_deserializer(ContentType::new("text/csv")?, Arc::new(CsvDeserializer));
    ///
    /// let client = RestClient::builder()
    ///     .configuration(Arc::new(config))
    ///     .build()?;
    /// ```
    pub fn configuration(mut self, config: Arc<RestConfiguration>) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the default request options.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.timeout(timeout);
        self
    }

    /// Sets the default content type for request bodies.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.options = self.options.content_type(content_type);
        self
    }

    /// Sets the default `User-Agent`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options = self.options.user_agent(user_agent);
        self
    }

    /// Sets redirect, compression and connection reuse behavior.
    pub fn transport_options(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    /// Builds a client on the default `reqwest` transport.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<RestClient, RestError> {
        let transport = ReqwestTransport::new(&self.transport)?;
        Ok(self.build_with_transport(transport))
    }

    /// Builds a client on a custom transport.
    ///
    /// [`TransportOptions`] are ignored; the transport is used as given.
    pub fn build_with_transport<T: Transport>(self, transport: T) -> RestClient<T> {
        RestClient {
            transport: Arc::new(transport),
            config: self.config.unwrap_or_default(),
            options: self.options,
        }
    }
}

/// Creates [`RestRequest`]s that share a transport and configuration.
///
/// Cloning is cheap; clones share the connection pool.
///
/// ## Examples
///
/// ```rust,ignore
/// use resty::{RestClient, RestUri};
///
/// #[derive(serde::Deserialize, Default)]
/// struct User { id: u64, name: String }
///
/// let client = RestClient::new()?;
/// let uri = RestUri::with_resource("https://api.example.com", "users/{id}")?
///     .set_parameter("id", 1);
///
/// let response = client.get(uri).send_typed::<User>().await?;
/// let user = response.data().await?;
/// ```
pub struct RestClient<T = ReqwestTransport> {
    transport: Arc<T>,
    config: Arc<RestConfiguration>,
    options: RequestOptions,
}

impl RestClient {
    /// Creates a new builder.
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    /// Creates a client with the default configuration and options.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, RestError> {
        Self::builder().build()
    }
}

impl<T: Transport> RestClient<T> {
    /// Creates a request for `method` against `uri`.
    pub fn request(&self, method: RestMethod, uri: RestUri) -> RestRequest<T> {
        RestRequest::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.config),
            self.options.clone(),
            method,
            uri,
        )
    }

    /// Starts a `GET` request.
    pub fn get(&self, uri: RestUri) -> RestRequest<T> {
        self.request(RestMethod::Get, uri)
    }

    /// Starts a `POST` request.
    pub fn post(&self, uri: RestUri) -> RestRequest<T> {
        self.request(RestMethod::Post, uri)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, uri: RestUri) -> RestRequest<T> {
        self.request(RestMethod::Put, uri)
    }

    /// Starts a `PATCH` request.
    pub fn patch(&self, uri: RestUri) -> RestRequest<T> {
        self.request(RestMethod::Patch, uri)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, uri: RestUri) -> RestRequest<T> {
        self.request(RestMethod::Delete, uri)
    }

    /// Returns the shared configuration.
    pub fn configuration(&self) -> &Arc<RestConfiguration> {
        &self.config
    }

    /// Returns the defaults applied to new requests.
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }
}

impl<T> Clone for RestClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            options: self.options.clone(),
        }
    }
}

impl<T> fmt::Debug for RestClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("transport", &std::any::type_name::<T>())
            .field("config", &self.config)
            .field("options", &self.options)
            .finish()
    }
}
