//! Request payloads.
//!
//! A [`RequestBody`] is one of three shapes. Structured values go through the
//! serializer registered for the request's content type, while raw bytes and
//! pre-formatted text bypass the registry entirely.

use std::borrow::Cow;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::config::RestConfiguration;
use crate::content_type::ContentType;
use crate::error::ValidationError;

/// Root element used when no type name is available.
const DEFAULT_ROOT: &str = "root";

/// A structured value destined for a content-type serializer.
///
/// The value is captured as a [`serde_json::Value`] so any registered
/// serializer can encode it. Field order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectBody {
    value: Value,
    root_name: Cow<'static, str>,
}

impl ObjectBody {
    /// Captures `value`, naming the XML root after its type.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError::JsonSerialize`] if the value's `Serialize`
    /// implementation fails.
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self, ValidationError> {
        Ok(Self {
            value: serde_json::to_value(value).map_err(ValidationError::JsonSerialize)?,
            root_name: Cow::Owned(root_name_of(std::any::type_name::<T>())),
        })
    }

    /// Wraps an existing JSON value; the XML root is named `root`.
    pub fn from_value(value: Value) -> Self {
        Self {
            value,
            root_name: Cow::Borrowed(DEFAULT_ROOT),
        }
    }

    /// Overrides the XML root element name.
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Cow::Owned(name.into());
        self
    }

    /// Returns the captured value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the XML root element name.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }
}

/// `my_app::models::Account<T>` becomes `Account`.
fn root_name_of(type_name: &str) -> String {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    let last = without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics);
    let is_identifier = last.starts_with(|c: char| c.is_alphabetic() || c == '_')
        && last.chars().all(|c| c.is_alphanumeric() || c == '_');
    if is_identifier {
        last.to_string()
    } else {
        DEFAULT_ROOT.to_string()
    }
}

/// Data destined for the wire.
///
/// ## Examples
///
/// ```rust
/// use resty::{ContentType, RequestBody, RestConfiguration};
///
/// let config = RestConfiguration::default();
/// let body = RequestBody::object(&serde_json::json!({ "q": "a b" })).unwrap();
///
/// let form = body.render_string(&ContentType::FORM_URLENCODED, &config).unwrap();
/// assert_eq!(form, "q=a%20b");
///
/// let json = body.render_string(&ContentType::APPLICATION_JSON, &config).unwrap();
/// assert_eq!(json, r#"{"q":"a b"}"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A structured value encoded by the registered serializer.
    Object(ObjectBody),
    /// Opaque bytes sent verbatim.
    RawBytes(Bytes),
    /// Pre-formatted text sent verbatim.
    PlainText(String),
}

impl RequestBody {
    /// Creates an [`Object`](Self::Object) body from any serializable value.
    ///
    /// ## Errors
    ///
    /// See [`ObjectBody::new`].
    pub fn object<T: Serialize + ?Sized>(value: &T) -> Result<Self, ValidationError> {
        ObjectBody::new(value).map(Self::Object)
    }

    /// Creates a [`RawBytes`](Self::RawBytes) body.
    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Self::RawBytes(bytes.into())
    }

    /// Creates a [`PlainText`](Self::PlainText) body.
    pub fn text(text: impl Into<String>) -> Self {
        Self::PlainText(text.into())
    }

    /// Renders the body as text for `content_type`.
    ///
    /// Plain text is returned unchanged and raw bytes are decoded as ASCII,
    /// with bytes above `0x7F` replaced by `?`. Only object bodies consult the
    /// serializer registry.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError::UnsupportedContentType`] when no serializer
    /// is registered for `content_type`, or the serializer's own error.
    pub fn render_string(
        &self,
        content_type: &ContentType,
        config: &RestConfiguration,
    ) -> Result<String, ValidationError> {
        match self {
            Self::Object(body) => config
                .serializer_for(content_type.as_str())
                .ok_or_else(|| ValidationError::unsupported(content_type.essence()))?
                .serialize(body),
            Self::RawBytes(bytes) => Ok(bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { '?' })
                .collect()),
            Self::PlainText(text) => Ok(text.clone()),
        }
    }

    /// Renders the body as bytes for `content_type`.
    ///
    /// Raw bytes are returned verbatim; every other variant is the UTF-8
    /// encoding of [`render_string`](Self::render_string).
    ///
    /// ## Errors
    ///
    /// See [`render_string`](Self::render_string).
    pub fn render_bytes(
        &self,
        content_type: &ContentType,
        config: &RestConfiguration,
    ) -> Result<Bytes, ValidationError> {
        match self {
            Self::RawBytes(bytes) => Ok(bytes.clone()),
            _ => self.render_string(content_type, config).map(Bytes::from),
        }
    }
}

impl From<ObjectBody> for RequestBody {
    fn from(body: ObjectBody) -> Self {
        Self::Object(body)
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::RawBytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::RawBytes(bytes.into())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::PlainText(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::PlainText(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Login {
        user: String,
        remember: bool,
    }

    #[test]
    fn test_raw_bytes_round_trip_verbatim() {
        let config = RestConfiguration::empty();
        let body = RequestBody::raw(vec![0xFF, 0x00, 0x41]);

        let bytes = body.render_bytes(&ContentType::OCTET_STREAM, &config).unwrap();
        assert_eq!(bytes.as_ref(), &[0xFF, 0x00, 0x41]);

        let text = body.render_string(&ContentType::OCTET_STREAM, &config).unwrap();
        assert_eq!(text, "?\0A");
    }

    #[test]
    fn test_plain_text_ignores_content_type() {
        let config = RestConfiguration::empty();
        let body = RequestBody::text("héllo");
        assert_eq!(
            body.render_string(&ContentType::APPLICATION_JSON, &config).unwrap(),
            "héllo"
        );
        assert_eq!(
            body.render_bytes(&ContentType::APPLICATION_JSON, &config).unwrap().as_ref(),
            "héllo".as_bytes()
        );
    }

    #[test]
    fn test_object_uses_registered_serializer() {
        let config = RestConfiguration::default();
        let body = RequestBody::object(&Login {
            user: "ann".to_string(),
            remember: true,
        })
        .unwrap();

        let json = ContentType::new("application/json; charset=utf-8").unwrap();
        assert_eq!(
            body.render_string(&json, &config).unwrap(),
            r#"{"user":"ann","remember":true}"#
        );
        assert_eq!(
            body.render_string(&ContentType::FORM_URLENCODED, &config).unwrap(),
            "user=ann&remember=true"
        );
        assert_eq!(
            body.render_string(&ContentType::TEXT_XML, &config).unwrap(),
            "<Login><user>ann</user><remember>true</remember></Login>"
        );
    }

    #[test]
    fn test_object_without_serializer_is_unsupported() {
        let config = RestConfiguration::default();
        let body = RequestBody::object(&json!({ "a": 1 })).unwrap();
        let err = body
            .render_bytes(&ContentType::new("application/msgpack").unwrap(), &config)
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported content type: application/msgpack");
    }

    #[test]
    fn test_root_name_of() {
        assert_eq!(root_name_of("my_app::models::Account"), "Account");
        assert_eq!(root_name_of("my_app::Page<my_app::Item>"), "Page");
        assert_eq!(root_name_of("serde_json::value::Value"), "Value");
        assert_eq!(root_name_of("(i32, i32)"), "root");
        assert_eq!(root_name_of("[u8]"), "root");
    }

    #[test]
    fn test_root_name_override() {
        let body = ObjectBody::new(&json!({})).unwrap().with_root_name("Request");
        assert_eq!(body.root_name(), "Request");
        assert_eq!(ObjectBody::from_value(json!(null)).root_name(), "root");
    }
}
