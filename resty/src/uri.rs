//! URI templating and query-string composition.
//!
//! A [`RestUri`] joins a base URL with a relative resource path, substitutes
//! `{name}` template placeholders and accumulates query parameters, both those
//! written literally into the URLs and those set through
//! [`set_query`](RestUri::set_query).
//!
//! ## Examples
//!
//! ```rust
//! use resty::RestUri;
//!
//! let uri = RestUri::with_resource("http://localhost/api/", "/account/{id}?verbose")
//!     .unwrap()
//!     .set_parameter("id", 7)
//!     .set_query("email", "a@b.com");
//!
//! assert_eq!(
//!     uri.render(),
//!     "http://localhost/api/account/7?verbose&email=a%40b.com"
//! );
//! ```

use std::collections::HashMap;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use serde::Serialize;
use url::Url;

use crate::error::{ConfigError, RestError};
use crate::expand::{expand, Expanded};

/// Everything but the RFC 3986 unreserved characters is escaped in values.
const DATA_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Characters that cannot appear raw in the literal portion of a path.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?');

/// Value of a query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryValue {
    /// A bare key rendered without `=`, e.g. `?123456` or `?verbose`.
    Valueless,
    /// A key rendered as `key=value` with the value escaped.
    Value(String),
}

impl QueryValue {
    /// Returns the value, or `None` for a valueless key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Valueless => None,
            Self::Value(value) => Some(value),
        }
    }
}

/// A request target built from a base URL, a resource template and parameters.
///
/// Setters consume and return `self` so calls chain. Setting a template or
/// query parameter twice keeps only the last value; query parameters render in
/// the order their keys were first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestUri {
    authority: String,
    resource_path: String,
    template_parameters: HashMap<String, String>,
    query: Vec<(String, QueryValue)>,
}

impl RestUri {
    /// Creates a target that points at `base` itself.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when `base` is not an absolute URL.
    pub fn new(base: &str) -> Result<Self, RestError> {
        Self::with_resource(base, "")
    }

    /// Creates a target by merging `resource` onto `base`.
    ///
    /// `resource` must be relative. A resource consisting only of a query
    /// string (`"?id=1"`) attaches to the base path unchanged.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for an unparsable base and
    /// [`ConfigError::NotRelative`] for an absolute resource.
    pub fn with_resource(base: &str, resource: &str) -> Result<Self, RestError> {
        let base = Url::parse(base).map_err(ConfigError::InvalidUrl)?;
        Self::from_url(&base, resource)
    }

    /// Creates a target from an already parsed base URL.
    ///
    /// ## Errors
    ///
    /// See [`with_resource`](Self::with_resource).
    pub fn from_url(base: &Url, resource: &str) -> Result<Self, RestError> {
        if base.cannot_be_a_base() {
            return Err(ConfigError::CannotBeABase {
                url: base.to_string(),
            }
            .into());
        }
        if Url::parse(resource).is_ok() {
            return Err(ConfigError::NotRelative {
                resource: resource.to_string(),
            }
            .into());
        }

        let base_path = decode_braces(base.path());
        let (resource_path, resource_query) = split_resource(resource);
        let resource_path = merge_paths(&base_path, resource_path);

        let mut uri = Self {
            authority: authority_of(base),
            resource_path,
            template_parameters: HashMap::new(),
            query: Vec::new(),
        };
        for query in base.query().into_iter().chain(resource_query) {
            for (name, value) in parse_query(query) {
                uri.upsert_query(name, value);
            }
        }
        Ok(uri)
    }

    /// Sets a template parameter substituted for `{name}` when rendering.
    pub fn set_parameter(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.template_parameters
            .insert(name.into(), value.to_string());
        self
    }

    /// Sets every named field of `params` as a template parameter.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] if `params` has no named fields.
    pub fn set_parameters<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self, RestError> {
        match expand(params)? {
            Expanded::Pairs(pairs) => {
                for (name, value) in pairs {
                    self = self.set_parameter(name, value);
                }
                Ok(self)
            }
            Expanded::Scalar(_) => Err(ConfigError::NotAnObject { found: "a scalar" }.into()),
        }
    }

    /// Sets a `name=value` query parameter.
    pub fn set_query(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.upsert_query(name.into(), QueryValue::Value(value.to_string()));
        self
    }

    /// Sets a valueless query key, rendered bare (`?name`).
    pub fn set_query_flag(mut self, name: impl Into<String>) -> Self {
        self.upsert_query(name.into(), QueryValue::Valueless);
        self
    }

    /// Sets query parameters from a structured value.
    ///
    /// Named fields become `name=value` pairs; a bare scalar becomes a single
    /// valueless key (`set_queries(&123456)` renders `?123456`).
    ///
    /// ## Errors
    ///
    /// Returns a validation error for sequences or unrepresentable values.
    pub fn set_queries<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self, RestError> {
        match expand(params)? {
            Expanded::Pairs(pairs) => {
                for (name, value) in pairs {
                    self = self.set_query(name, value);
                }
            }
            Expanded::Scalar(flag) => self = self.set_query_flag(flag),
        }
        Ok(self)
    }

    /// Returns `scheme://host[:port]`, with default ports elided.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns the merged path template before substitution.
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// Returns the value set for a template parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.template_parameters.get(name).map(String::as_str)
    }

    /// Returns the value set for a query key.
    pub fn query(&self, name: &str) -> Option<&QueryValue> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Iterates query parameters in render order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.query.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Renders the path with template parameters substituted.
    pub fn render_path(&self) -> String {
        let mut out = String::with_capacity(self.resource_path.len());
        let mut rest = self.resource_path.as_str();

        while let Some(open) = rest.find('{') {
            let (literal, tail) = rest.split_at(open);
            out.extend(utf8_percent_encode(literal, PATH_ESCAPE));
            match tail.find('}') {
                Some(close) => {
                    let name = &tail[1..close];
                    match self.template_parameters.get(name) {
                        Some(value) => out.extend(utf8_percent_encode(value, DATA_ESCAPE)),
                        None => out.push_str(&tail[..=close]),
                    }
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        }
        out.extend(utf8_percent_encode(rest, PATH_ESCAPE));
        out
    }

    /// Renders the query string without the leading `?`.
    pub fn render_query(&self) -> String {
        self.query
            .iter()
            .map(|(key, value)| match value {
                QueryValue::Valueless => key.clone(),
                QueryValue::Value(value) => format!("{key}={}", escape(value)),
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Renders the full URL.
    ///
    /// Rendering does not mutate the target; calling it repeatedly yields the
    /// same string.
    pub fn render(&self) -> String {
        let mut rendered = format!("{}{}", self.authority, self.render_path());
        let query = self.render_query();
        if !query.is_empty() {
            rendered.push('?');
            rendered.push_str(&query);
        }
        rendered
    }

    /// Renders and parses the target into a [`Url`].
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the rendered text is not a valid URL.
    pub fn to_url(&self) -> Result<Url, RestError> {
        Url::parse(&self.render()).map_err(|e| ConfigError::InvalidUrl(e).into())
    }

    fn upsert_query(&mut self, name: String, value: QueryValue) {
        match self.query.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.query.push((name, value)),
        }
    }
}

impl fmt::Display for RestUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Percent-encodes a template, query or form value.
pub(crate) fn escape(value: &str) -> String {
    utf8_percent_encode(value, DATA_ESCAPE).to_string()
}

/// `scheme://[user[:password]@]host[:port]`; `Url::port` is already `None`
/// for the scheme's default port.
fn authority_of(url: &Url) -> String {
    let mut authority = format!("{}://", url.scheme());
    if !url.username().is_empty() {
        authority.push_str(url.username());
        if let Some(password) = url.password() {
            authority.push(':');
            authority.push_str(password);
        }
        authority.push('@');
    }
    authority.push_str(url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        authority.push(':');
        authority.push_str(&port.to_string());
    }
    authority
}

/// Restores `{` and `}` in an already encoded path so placeholders written in
/// the base URL stay substitutable. Every other escape is kept as is.
fn decode_braces(path: &str) -> String {
    path.replace("%7B", "{")
        .replace("%7b", "{")
        .replace("%7D", "}")
        .replace("%7d", "}")
}

/// Splits a relative resource into its path and optional query. A fragment
/// is never sent to the server and is dropped.
fn split_resource(resource: &str) -> (&str, Option<&str>) {
    let resource = resource
        .split_once('#')
        .map_or(resource, |(before, _)| before)
        .trim_start_matches('/');
    match resource.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (resource, None),
    }
}

/// Joins an encoded base path with a relative path using single slashes.
fn merge_paths(base_path: &str, relative: &str) -> String {
    let base_path = if base_path.len() > 1 {
        base_path.trim_end_matches('/')
    } else {
        base_path
    };

    let joined = if relative.is_empty() {
        base_path.to_string()
    } else {
        format!("{base_path}/{relative}")
    };

    let mut collapsed = String::with_capacity(joined.len() + 1);
    for c in joined.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }
    if !collapsed.starts_with('/') {
        collapsed.insert(0, '/');
    }
    collapsed
}

/// Parses a literal query string into ordered name/value entries.
///
/// Values are decoded (`+` as space) so that rendering re-escapes them
/// consistently; keys are kept as written.
fn parse_query(query: &str) -> Vec<(String, QueryValue)> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, value)) => {
                let value = value.replace('+', " ");
                let value = percent_decode_str(&value).decode_utf8_lossy().into_owned();
                (name.to_string(), QueryValue::Value(value))
            }
            None => (part.to_string(), QueryValue::Valueless),
        })
        .collect()
}
