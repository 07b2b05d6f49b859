//! Built-in serialization strategies.

use super::{DecodeTarget, RequestSerializer, ResponseDeserializer};
use crate::body::ObjectBody;
use crate::error::ValidationError;
use crate::expand::{describe, expand_value, Expanded};
use crate::uri::escape;

/// JSON encoding and decoding via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl RequestSerializer for JsonCodec {
    fn serialize(&self, body: &ObjectBody) -> Result<String, ValidationError> {
        serde_json::to_string(body.value()).map_err(ValidationError::JsonSerialize)
    }
}

impl ResponseDeserializer for JsonCodec {
    fn deserialize(
        &self,
        content: &str,
        target: &mut dyn DecodeTarget,
    ) -> Result<(), ValidationError> {
        target.decode_json(content)
    }
}

/// XML encoding and decoding via `quick-xml`.
///
/// The root element is named after the body's root name, which defaults to
/// the serialized type's name.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl RequestSerializer for XmlCodec {
    fn serialize(&self, body: &ObjectBody) -> Result<String, ValidationError> {
        Ok(quick_xml::se::to_string_with_root(body.root_name(), body.value())?)
    }
}

impl ResponseDeserializer for XmlCodec {
    fn deserialize(
        &self,
        content: &str,
        target: &mut dyn DecodeTarget,
    ) -> Result<(), ValidationError> {
        target.decode_xml(content)
    }
}

/// YAML encoding and decoding via `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl RequestSerializer for YamlCodec {
    fn serialize(&self, body: &ObjectBody) -> Result<String, ValidationError> {
        serde_yaml::to_string(body.value()).map_err(ValidationError::YamlSerialize)
    }
}

impl ResponseDeserializer for YamlCodec {
    fn deserialize(
        &self,
        content: &str,
        target: &mut dyn DecodeTarget,
    ) -> Result<(), ValidationError> {
        target.decode_yaml(content)
    }
}

/// `application/x-www-form-urlencoded` encoding.
///
/// Every named field becomes `name=value` with the value percent-encoded;
/// `null` fields are kept with an empty value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormUrlEncodedSerializer;

impl RequestSerializer for FormUrlEncodedSerializer {
    fn serialize(&self, body: &ObjectBody) -> Result<String, ValidationError> {
        match expand_value(body.value())? {
            Expanded::Pairs(pairs) => Ok(pairs
                .iter()
                .map(|(name, value)| format!("{name}={}", escape(value)))
                .collect::<Vec<_>>()
                .join("&")),
            Expanded::Scalar(_) => Err(ValidationError::NotAnObject {
                found: describe(body.value()),
            }),
        }
    }
}
