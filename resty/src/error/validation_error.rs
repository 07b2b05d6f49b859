//! Payload encoding and decoding errors.

use thiserror::Error;

/// Errors while turning values into request payloads or response payloads
/// into values.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// No strategy is registered for the content type.
    #[error("Unsupported content type: {content_type}")]
    UnsupportedContentType {
        /// The content type that failed to resolve.
        content_type: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[source] serde_json::Error),

    /// JSON encoding failed.
    #[error("JSON serialize error: {0}")]
    JsonSerialize(#[source] serde_json::Error),

    /// YAML parsing failed.
    #[error("YAML parse error: {0}")]
    YamlParse(#[source] serde_yaml::Error),

    /// YAML encoding failed.
    #[error("YAML serialize error: {0}")]
    YamlSerialize(#[source] serde_yaml::Error),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::DeError),

    /// XML encoding failed.
    #[error("XML serialize error: {0}")]
    XmlSerialize(#[from] quick_xml::SeError),

    /// The form encoder needs named fields but got something else.
    #[error("Form encoding requires named fields, got {found}")]
    NotAnObject {
        /// Description of what was supplied instead.
        found: &'static str,
    },

    /// A deserializer returned without producing a value.
    #[error("Deserializer for {content_type} produced no value")]
    Undecoded {
        /// The content type whose deserializer misbehaved.
        content_type: String,
    },
}

impl ValidationError {
    /// Creates an unsupported content type error.
    pub fn unsupported(content_type: impl Into<String>) -> Self {
        Self::UnsupportedContentType {
            content_type: content_type.into(),
        }
    }

    /// Returns `true` if this is a parsing error.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::JsonParse(_) | Self::YamlParse(_) | Self::XmlParse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = ValidationError::unsupported("application/msgpack");
        assert_eq!(
            err.to_string(),
            "Unsupported content type: application/msgpack"
        );
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_json_parse_is_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err = ValidationError::JsonParse(json_err);
        assert!(err.is_parse_error());
    }
}
