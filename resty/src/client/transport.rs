//! The HTTP transport seam.
//!
//! [`RestRequest`](crate::RestRequest) never talks to the network itself. It
//! renders a [`TransportRequest`] and hands it to a [`Transport`], which
//! returns status, headers and a body stream. [`ReqwestTransport`] is the
//! default implementation.

use std::future::Future;

use bytes::Bytes;
use futures::stream;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::Version;
use url::Url;

use crate::config::TransportOptions;
use crate::error::ClientError;
use crate::method::RestMethod;
use crate::response::BodyStream;

/// Credentials applied by the transport.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP basic authentication.
    Basic {
        username: String,
        password: Option<String>,
    },
    /// `Authorization: Bearer <token>`.
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// A fully rendered request ready for the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: RestMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub credentials: Option<Credentials>,
}

/// What the transport received, with the body still unread.
pub struct TransportResponse {
    pub status: u16,
    pub version: Version,
    /// Final URL after redirects.
    pub url: Url,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("version", &self.version)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Sends rendered requests.
///
/// Implementations report connection and protocol failures as
/// [`ClientError`]; any HTTP status, including errors, is a successful send.
/// Timeouts and cancellation are handled by the caller, which drops the
/// returned future when either fires.
pub trait Transport: Send + Sync + 'static {
    /// Sends `request` and returns the response head with a streaming body.
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, ClientError>> + Send;
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport from `options`.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::Request`] if the TLS backend cannot be initialized
    /// or rejects the client identity.
    pub fn new(options: &TransportOptions) -> Result<Self, ClientError> {
        let redirect = if options.follow_redirects {
            Policy::limited(options.max_redirects)
        } else {
            Policy::none()
        };
        let mut builder = reqwest::Client::builder()
            .redirect(redirect)
            .gzip(options.gzip)
            .deflate(options.deflate)
            .tcp_keepalive(options.tcp_keepalive);
        if let Some(identity) = &options.identity {
            builder = builder.identity(identity.clone());
        }
        if !options.keep_alive {
            builder = builder.pool_max_idle_per_host(0);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wraps an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest()?, request.url)
            .headers(request.headers);

        builder = match request.credentials {
            Some(Credentials::Basic { username, password }) => {
                builder.basic_auth(username, password)
            }
            Some(Credentials::Bearer(token)) => builder.bearer_auth(token),
            None => builder,
        };
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let version = response.version();
        let url = response.url().clone();
        let headers = response.headers().clone();

        let body = stream::try_unfold(response, |mut response| async move {
            Ok::<_, ClientError>(response.chunk().await?.map(|chunk| (chunk, response)))
        });

        Ok(TransportResponse {
            status,
            version,
            url,
            headers,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use futures::TryStreamExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(url: Url) -> TransportRequest {
        TransportRequest {
            method: RestMethod::Get,
            url,
            headers: HeaderMap::new(),
            body: None,
            credentials: None,
        }
    }

    #[tokio::test]
    async fn test_send_streams_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(201).set_body_string("payload"))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new(&TransportOptions::default()).unwrap();
        let url = Url::parse(&format!("{}/data", mock_server.uri())).unwrap();
        let response = transport.send(request(url)).await.unwrap();

        assert_eq!(response.status, 201);
        let chunks: Vec<Bytes> = response.body.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"payload");
    }

    #[tokio::test]
    async fn test_basic_credentials() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new(&TransportOptions::default()).unwrap();
        let mut req = request(Url::parse(&mock_server.uri()).unwrap());
        req.credentials = Some(Credentials::Basic {
            username: "user".to_string(),
            password: Some("pass".to_string()),
        });

        assert_eq!(transport.send(req).await.unwrap().status, 204);
    }

    #[tokio::test]
    async fn test_redirects_can_be_disabled() {
        let mock_server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
            .mount(&mock_server)
            .await;

        let options = TransportOptions {
            follow_redirects: false,
            ..TransportOptions::default()
        };
        let transport = ReqwestTransport::new(&options).unwrap();
        let url = Url::parse(&format!("{}/old", mock_server.uri())).unwrap();

        assert_eq!(transport.send(request(url)).await.unwrap().status, 302);
    }

    #[tokio::test]
    async fn test_identity_and_tcp_keepalive_are_applied() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let pem = include_bytes!("../../tests/fixtures/client_identity.pem");
        let options = TransportOptions::default()
            .identity(reqwest::Identity::from_pem(pem).unwrap())
            .tcp_keepalive(Duration::from_secs(30));
        assert!(format!("{options:?}").contains("Identity"));

        let transport = ReqwestTransport::new(&options).unwrap();
        let url = Url::parse(&mock_server.uri()).unwrap();
        assert_eq!(transport.send(request(url)).await.unwrap().status, 200);
    }

    #[test]
    fn test_malformed_identity_is_rejected() {
        assert!(reqwest::Identity::from_pem(b"not a pem bundle").is_err());
    }

    #[tokio::test]
    async fn test_connection_refused_is_client_error() {
        let transport = ReqwestTransport::new(&TransportOptions::default()).unwrap();
        let url = Url::parse("http://127.0.0.1:1/").unwrap();

        let err = transport.send(request(url)).await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let basic = Credentials::Basic {
            username: "ann".to_string(),
            password: Some("secret".to_string()),
        };
        let bearer = Credentials::Bearer("token".to_string());
        assert!(!format!("{basic:?}").contains("secret"));
        assert!(!format!("{bearer:?}").contains("token"));
    }
}
