//! `Set-Cookie` parsing.

/// A cookie set by the server.
///
/// Attribute names are matched case-insensitively. Flag attributes such as
/// `Secure` carry no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie {
    name: String,
    value: String,
    attributes: Vec<(String, Option<String>)>,
}

impl ResponseCookie {
    /// Parses a single `Set-Cookie` header value.
    ///
    /// Returns `None` when the value has no `name=value` pair or the name is
    /// empty.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use resty::ResponseCookie;
    ///
    /// let cookie = ResponseCookie::parse("sid=abc123; Path=/; HttpOnly").unwrap();
    /// assert_eq!(cookie.name(), "sid");
    /// assert_eq!(cookie.value(), "abc123");
    /// assert_eq!(cookie.path(), Some("/"));
    /// assert!(cookie.is_http_only());
    /// ```
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let attributes = parts
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), Some(value.trim().to_string())),
                None => (part.to_string(), None),
            })
            .collect();

        Some(Self {
            name: name.to_string(),
            value: value.trim().trim_matches('"').to_string(),
            attributes,
        })
    }

    /// Returns the cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cookie value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the value of an attribute such as `Max-Age`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_deref())
    }

    /// Returns `true` if the attribute is present, with or without a value.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Returns the `Path` attribute.
    pub fn path(&self) -> Option<&str> {
        self.attribute("Path")
    }

    /// Returns the `Domain` attribute.
    pub fn domain(&self) -> Option<&str> {
        self.attribute("Domain")
    }

    /// Whether the `Secure` flag was set.
    pub fn is_secure(&self) -> bool {
        self.has_attribute("Secure")
    }

    /// Whether the `HttpOnly` flag was set.
    pub fn is_http_only(&self) -> bool {
        self.has_attribute("HttpOnly")
    }
}
