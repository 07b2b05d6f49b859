//! Responses decoded into a caller-chosen type.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::RestResponse;
use crate::config::RestConfiguration;
use crate::content_type::essence_of;
use crate::error::{RestError, ValidationError};
use crate::serialization::decode;

/// A [`RestResponse`] whose body decodes to `T`.
///
/// Dereferences to the underlying response for status, headers and body.
pub struct TypedResponse<T> {
    response: RestResponse,
    config: Arc<RestConfiguration>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedResponse<T> {
    pub(crate) fn new(response: RestResponse, config: Arc<RestConfiguration>) -> Self {
        Self {
            response,
            config,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped response.
    pub fn into_inner(self) -> RestResponse {
        self.response
    }

    /// Typed form of [`RestResponse::ensure_success`].
    ///
    /// ## Errors
    ///
    /// See [`RestResponse::ensure_success`].
    pub async fn ensure_success(self) -> Result<Self, RestError> {
        let config = self.config;
        let response = self.response.ensure_success().await?;
        Ok(Self::new(response, config))
    }
}

impl<T: DeserializeOwned + Default> TypedResponse<T> {
    /// Decodes the body with the deserializer registered for the response's
    /// content type.
    ///
    /// A blank body yields `T::default()` without consulting the registry.
    /// Each call decodes again from the buffered text.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError::UnsupportedContentType`] when no
    /// deserializer matches, or the deserializer's parse error.
    pub async fn data(&self) -> Result<T, RestError> {
        let content = self.response.body().read_as_string().await;
        if content.trim().is_empty() {
            return Ok(T::default());
        }

        let content_type = self.response.content_type().unwrap_or_default();
        let deserializer = self
            .config
            .deserializer_for(content_type)
            .ok_or_else(|| ValidationError::unsupported(essence_of(content_type)))?;
        Ok(decode(deserializer.as_ref(), content_type, content)?)
    }
}

impl<T> Deref for TypedResponse<T> {
    type Target = RestResponse;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl<T> fmt::Debug for TypedResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedResponse")
            .field("type", &std::any::type_name::<T>())
            .field("response", &self.response)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportResponse;
    use crate::method::RestMethod;
    use crate::error::ClientError;
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use url::Url;

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Account {
        id: u32,
        name: String,
    }

    fn typed(content_type: Option<&'static str>, body: &'static str) -> TypedResponse<Account> {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        let response = RestResponse::from_transport(
            RestMethod::Get,
            TransportResponse {
                status: 200,
                version: reqwest::Version::HTTP_11,
                url: Url::parse("http://localhost/").unwrap(),
                headers,
                body: Box::pin(futures::stream::iter(vec![Ok::<_, ClientError>(Bytes::from_static(
                    body.as_bytes(),
                ))])),
            },
        );
        TypedResponse::new(response, Arc::new(RestConfiguration::default()))
    }

    #[tokio::test]
    async fn test_decodes_by_content_type() {
        let json = typed(Some("application/json; charset=utf-8"), r#"{"id":1,"name":"ann"}"#);
        assert_eq!(
            json.data().await.unwrap(),
            Account { id: 1, name: "ann".to_string() }
        );

        let xml = typed(Some("text/xml"), "<Account><id>2</id><name>bo</name></Account>");
        assert_eq!(xml.data().await.unwrap().id, 2);

        let yaml = typed(Some("application/x-yaml"), "id: 3\nname: cy\n");
        assert_eq!(yaml.data().await.unwrap().name, "cy");
    }

    #[tokio::test]
    async fn test_blank_body_is_default() {
        let blank = typed(Some("application/msgpack"), "  \n");
        assert_eq!(blank.data().await.unwrap(), Account::default());
    }

    #[tokio::test]
    async fn test_unregistered_content_type_fails_on_access() {
        let response = typed(Some("application/msgpack"), "\u{1}");
        let err = response.data().await.unwrap_err();
        assert!(err.is_unsupported_content_type());
        assert_eq!(err.to_string(), "Unsupported content type: application/msgpack");

        let missing = typed(None, "{}");
        assert!(missing.data().await.unwrap_err().is_unsupported_content_type());
    }

    #[tokio::test]
    async fn test_deref_and_repeat_decode() {
        let response = typed(Some("application/json"), r#"{"id":9,"name":"x"}"#);
        assert!(response.is_success());
        assert_eq!(response.data().await.unwrap().id, 9);
        assert_eq!(response.data().await.unwrap().id, 9);
        assert_eq!(response.into_inner().status_code(), 200);
    }
}
