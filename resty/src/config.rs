//! Explicit configuration shared by requests.
//!
//! [`RestConfiguration`] owns the serializer and deserializer registries.
//! Registration takes `&mut self`, so a configuration is populated first and
//! then shared behind an `Arc`; once shared it is read-only.
//!
//! [`RequestOptions`] carries per-request defaults and [`TransportOptions`]
//! the settings baked into the HTTP transport when it is built.

use std::sync::Arc;
use std::time::Duration;

use crate::content_type::ContentType;
use crate::serialization::{
    DeserializerRegistry, FormUrlEncodedSerializer, JsonCodec, RequestSerializer,
    ResponseDeserializer, SerializerRegistry, XmlCodec, YamlCodec,
};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6 * 60);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "resty-RestRequest";

/// Default redirect limit.
pub const DEFAULT_MAX_REDIRECTS: usize = 50;

/// Default idle time before TCP keep-alive probes start.
pub const DEFAULT_TCP_KEEPALIVE: Duration = Duration::from_secs(2 * 60 * 60);

/// The serializer and deserializer registries used by every request.
///
/// ## Examples
///
/// ```rust
/// use std::sync::Arc;
/// use resty::{ContentType, RestConfiguration};
/// use resty::serialization::YamlCodec;
///
/// let mut config = RestConfiguration::default();
/// config.register_serializer(ContentType::APPLICATION_YAML, Arc::new(YamlCodec));
///
/// let shared = Arc::new(config);
/// assert!(shared.serializer_for("application/yaml").is_some());
/// assert!(shared.deserializer_for("text/json; charset=utf-8").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RestConfiguration {
    serializers: SerializerRegistry,
    deserializers: DeserializerRegistry,
}

impl RestConfiguration {
    /// Creates a configuration with nothing registered.
    pub fn empty() -> Self {
        Self {
            serializers: SerializerRegistry::new(),
            deserializers: DeserializerRegistry::new(),
        }
    }

    /// Binds a request-body serializer to `content_type`.
    pub fn register_serializer(
        &mut self,
        content_type: ContentType,
        serializer: Arc<dyn RequestSerializer>,
    ) -> &mut Self {
        self.serializers.register(&content_type, serializer);
        self
    }

    /// Binds a response-body deserializer to `content_type`.
    pub fn register_deserializer(
        &mut self,
        content_type: ContentType,
        deserializer: Arc<dyn ResponseDeserializer>,
    ) -> &mut Self {
        self.deserializers.register(&content_type, deserializer);
        self
    }

    /// Resolves the serializer for a raw content type value.
    pub fn serializer_for(&self, content_type: &str) -> Option<Arc<dyn RequestSerializer>> {
        self.serializers.resolve(content_type)
    }

    /// Resolves the deserializer for a raw content type value.
    pub fn deserializer_for(&self, content_type: &str) -> Option<Arc<dyn ResponseDeserializer>> {
        self.deserializers.resolve(content_type)
    }

    /// Returns the request-side registry.
    pub fn serializers(&self) -> &SerializerRegistry {
        &self.serializers
    }

    /// Returns the response-side registry.
    pub fn deserializers(&self) -> &DeserializerRegistry {
        &self.deserializers
    }
}

impl Default for RestConfiguration {
    /// JSON and XML on both sides, YAML for responses and form encoding
    /// for requests.
    fn default() -> Self {
        let mut config = Self::empty();

        let json = Arc::new(JsonCodec);
        for content_type in [
            ContentType::APPLICATION_JSON,
            ContentType::APPLICATION_X_JSON,
            ContentType::TEXT_JSON,
        ] {
            config
                .register_serializer(content_type.clone(), json.clone())
                .register_deserializer(content_type, json.clone());
        }

        let xml = Arc::new(XmlCodec);
        for content_type in [ContentType::APPLICATION_XML, ContentType::TEXT_XML] {
            config
                .register_serializer(content_type.clone(), xml.clone())
                .register_deserializer(content_type, xml.clone());
        }

        let yaml = Arc::new(YamlCodec);
        for content_type in [
            ContentType::APPLICATION_YAML,
            ContentType::APPLICATION_X_YAML,
            ContentType::TEXT_YAML,
        ] {
            config.register_deserializer(content_type, yaml.clone());
        }

        config.register_serializer(ContentType::FORM_URLENCODED, Arc::new(FormUrlEncodedSerializer));
        config
    }
}

/// Per-request defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub(crate) content_type: ContentType,
    pub(crate) timeout: Option<Duration>,
    pub(crate) user_agent: String,
    pub(crate) referer: Option<String>,
}

impl RequestOptions {
    /// Sets the content type used to encode object bodies.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Sets the timeout raced against the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disables the timeout.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Sets the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the `Referer` header.
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            content_type: ContentType::FORM_URLENCODED,
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: None,
        }
    }
}

/// Settings applied when the HTTP transport is built.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Follow `3xx` redirects.
    pub follow_redirects: bool,
    /// Maximum redirects followed per request.
    pub max_redirects: usize,
    /// Accept and decode gzip responses.
    pub gzip: bool,
    /// Accept and decode deflate responses.
    pub deflate: bool,
    /// Reuse idle connections.
    pub keep_alive: bool,
    /// Idle time before TCP keep-alive probes are sent; `None` disables them.
    pub tcp_keepalive: Option<Duration>,
    /// Client certificate and key presented during the TLS handshake.
    pub identity: Option<reqwest::Identity>,
}

impl TransportOptions {
    /// Presents `identity` to servers that request a client certificate.
    pub fn identity(mut self, identity: reqwest::Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the TCP keep-alive idle time, or disables keep-alive probes.
    pub fn tcp_keepalive(mut self, idle: impl Into<Option<Duration>>) -> Self {
        self.tcp_keepalive = idle.into();
        self
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            gzip: true,
            deflate: true,
            keep_alive: true,
            tcp_keepalive: Some(DEFAULT_TCP_KEEPALIVE),
            identity: None,
        }
    }
}
