//! MIME type values used as serializer/deserializer registry keys.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A MIME type as sent in a `Content-Type` header.
///
/// The full value (including parameters such as `charset`) is kept for the
/// wire, while [`essence`](Self::essence) yields the normalized key used for
/// registry lookups.
///
/// ## Examples
///
/// ```rust
/// use resty::ContentType;
///
/// let ct: ContentType = "Application/JSON; charset=utf-8".parse().unwrap();
/// assert_eq!(ct.essence(), "application/json");
/// assert_eq!(ct.parameter("charset"), Some("utf-8"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentType(Cow<'static, str>);

impl ContentType {
    /// `application/json`
    pub const APPLICATION_JSON: ContentType = ContentType(Cow::Borrowed("application/json"));
    /// `application/x-json`
    pub const APPLICATION_X_JSON: ContentType = ContentType(Cow::Borrowed("application/x-json"));
    /// `text/json`
    pub const TEXT_JSON: ContentType = ContentType(Cow::Borrowed("text/json"));
    /// `application/xml`
    pub const APPLICATION_XML: ContentType = ContentType(Cow::Borrowed("application/xml"));
    /// `text/xml`
    pub const TEXT_XML: ContentType = ContentType(Cow::Borrowed("text/xml"));
    /// `application/yaml`
    pub const APPLICATION_YAML: ContentType = ContentType(Cow::Borrowed("application/yaml"));
    /// `application/x-yaml`
    pub const APPLICATION_X_YAML: ContentType = ContentType(Cow::Borrowed("application/x-yaml"));
    /// `text/yaml`
    pub const TEXT_YAML: ContentType = ContentType(Cow::Borrowed("text/yaml"));
    /// `application/x-www-form-urlencoded`
    pub const FORM_URLENCODED: ContentType =
        ContentType(Cow::Borrowed("application/x-www-form-urlencoded"));
    /// `text/plain`
    pub const TEXT_PLAIN: ContentType = ContentType(Cow::Borrowed("text/plain"));
    /// `application/octet-stream`
    pub const OCTET_STREAM: ContentType = ContentType(Cow::Borrowed("application/octet-stream"));

    /// Creates a custom content type.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::EmptyContentType`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ConfigError::EmptyContentType);
        }
        Ok(Self(Cow::Owned(value)))
    }

    /// Creates a `multipart/form-data` content type with the given boundary.
    pub fn multipart_form_data(boundary: &str) -> Self {
        Self(Cow::Owned(format!("multipart/form-data; boundary={boundary}")))
    }

    /// Returns the full header value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the normalized MIME type without parameters.
    pub fn essence(&self) -> String {
        essence_of(&self.0)
    }

    /// Returns the value of a `;`-separated parameter such as `charset`.
    ///
    /// Parameter names match case-insensitively; surrounding quotes are removed.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        parameter_of(&self.0, name)
    }
}

/// Strips any `;` parameter suffix, trims and lowercases a MIME type.
///
/// `application/json; charset=utf-8` becomes `application/json`.
pub fn essence_of(raw: &str) -> String {
    let head = raw.split(';').next().unwrap_or_default();
    head.trim().to_ascii_lowercase()
}

/// Looks up a named parameter in a raw `Content-Type` value.
pub fn parameter_of<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case(name) {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::FORM_URLENCODED
    }
}
