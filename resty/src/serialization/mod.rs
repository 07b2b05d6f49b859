//! Content-type driven payload encoding and decoding.
//!
//! A [`RequestSerializer`] turns an [`ObjectBody`] into wire text, a
//! [`ResponseDeserializer`] turns response text back into a typed value. Both
//! are looked up by MIME type in a [`Registry`] owned by the
//! [`RestConfiguration`](crate::RestConfiguration).
//!
//! Deserializers are stored as trait objects, so they cannot be generic over
//! the target type. Instead the caller hands them a [`DecodeTarget`] that knows
//! the concrete type, and the deserializer picks the format:
//!
//! ```rust
//! use resty::serialization::{decode, JsonCodec};
//!
//! #[derive(serde::Deserialize, Debug, PartialEq)]
//! struct Account { id: u32 }
//!
//! let account: Account = decode(&JsonCodec, "application/json", r#"{"id":7}"#).unwrap();
//! assert_eq!(account, Account { id: 7 });
//! ```

mod formats;
mod registry;

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::body::ObjectBody;
use crate::error::ValidationError;

pub use formats::{FormUrlEncodedSerializer, JsonCodec, XmlCodec, YamlCodec};
pub use registry::{DeserializerRegistry, Registry, SerializerRegistry};

/// Strategy that encodes a structured request body.
pub trait RequestSerializer: fmt::Debug + Send + Sync {
    /// Encodes `body` as text.
    ///
    /// ## Errors
    ///
    /// Returns a [`ValidationError`] when the value cannot be represented in
    /// this format.
    fn serialize(&self, body: &ObjectBody) -> Result<String, ValidationError>;
}

/// Strategy that decodes response text into a caller-chosen type.
pub trait ResponseDeserializer: fmt::Debug + Send + Sync {
    /// Decodes `content` into `target`.
    ///
    /// Implementations call exactly one of the `decode_*` methods on `target`.
    ///
    /// ## Errors
    ///
    /// Returns the parse error reported by `target`.
    fn deserialize(&self, content: &str, target: &mut dyn DecodeTarget)
        -> Result<(), ValidationError>;
}

/// The receiving end of a decode, typed by the caller.
pub trait DecodeTarget {
    /// Parses `content` as JSON.
    fn decode_json(&mut self, content: &str) -> Result<(), ValidationError>;

    /// Parses `content` as XML.
    fn decode_xml(&mut self, content: &str) -> Result<(), ValidationError>;

    /// Parses `content` as YAML.
    fn decode_yaml(&mut self, content: &str) -> Result<(), ValidationError>;

    /// Converts an already parsed value, for deserializers with their own parser.
    fn decode_value(&mut self, value: Value) -> Result<(), ValidationError>;
}

/// A [`DecodeTarget`] holding the decoded value once filled.
#[derive(Debug)]
pub struct Slot<T>(Option<T>);

impl<T> Slot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self(None)
    }

    /// Takes the decoded value, if any.
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> DecodeTarget for Slot<T> {
    fn decode_json(&mut self, content: &str) -> Result<(), ValidationError> {
        self.0 = Some(serde_json::from_str(content).map_err(ValidationError::JsonParse)?);
        Ok(())
    }

    fn decode_xml(&mut self, content: &str) -> Result<(), ValidationError> {
        self.0 = Some(quick_xml::de::from_str(content)?);
        Ok(())
    }

    fn decode_yaml(&mut self, content: &str) -> Result<(), ValidationError> {
        self.0 = Some(serde_yaml::from_str(content).map_err(ValidationError::YamlParse)?);
        Ok(())
    }

    fn decode_value(&mut self, value: Value) -> Result<(), ValidationError> {
        self.0 = Some(serde_json::from_value(value).map_err(ValidationError::JsonParse)?);
        Ok(())
    }
}

/// Runs `deserializer` over `content` and returns the decoded value.
///
/// ## Errors
///
/// Returns the deserializer's parse error, or [`ValidationError::Undecoded`]
/// if it returned without filling the target.
pub fn decode<T: DeserializeOwned>(
    deserializer: &dyn ResponseDeserializer,
    content_type: &str,
    content: &str,
) -> Result<T, ValidationError> {
    let mut slot = Slot::new();
    deserializer.deserialize(content, &mut slot)?;
    slot.into_inner().ok_or_else(|| ValidationError::Undecoded {
        content_type: content_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Debug)]
    struct Lazy;

    impl ResponseDeserializer for Lazy {
        fn deserialize(
            &self,
            _content: &str,
            _target: &mut dyn DecodeTarget,
        ) -> Result<(), ValidationError> {
            Ok(())
        }
    }

    /// Reads `x,y` pairs and hands a JSON value to the target.
    #[derive(Debug)]
    struct Csv;

    impl ResponseDeserializer for Csv {
        fn deserialize(
            &self,
            content: &str,
            target: &mut dyn DecodeTarget,
        ) -> Result<(), ValidationError> {
            let mut parts = content.trim().split(',');
            let x: i64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or_default();
            let y: i64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or_default();
            target.decode_value(serde_json::json!({ "x": x, "y": y }))
        }
    }

    #[test]
    fn test_slot_decodes_each_format() {
        let mut slot = Slot::<Point>::new();
        slot.decode_json(r#"{"x":1,"y":2}"#).unwrap();
        assert_eq!(slot.into_inner(), Some(Point { x: 1, y: 2 }));

        let mut slot = Slot::<Point>::new();
        slot.decode_yaml("x: 3\ny: 4\n").unwrap();
        assert_eq!(slot.into_inner(), Some(Point { x: 3, y: 4 }));

        let mut slot = Slot::<Point>::new();
        slot.decode_xml("<Point><x>5</x><y>6</y></Point>").unwrap();
        assert_eq!(slot.into_inner(), Some(Point { x: 5, y: 6 }));
    }

    #[test]
    fn test_custom_deserializer_via_value() {
        let point: Point = decode(&Csv, "text/csv", "7,8\n").unwrap();
        assert_eq!(point, Point { x: 7, y: 8 });
    }

    #[test]
    fn test_deserializer_that_fills_nothing() {
        let err = decode::<Point>(&Lazy, "text/csv", "1,2").unwrap_err();
        assert!(matches!(err, ValidationError::Undecoded { .. }));
        assert_eq!(err.to_string(), "Deserializer for text/csv produced no value");
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let err = decode::<Point>(&JsonCodec, "application/json", "{").unwrap_err();
        assert!(err.is_parse_error());
    }
}
