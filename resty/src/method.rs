//! HTTP method types for REST requests.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::ClientError;

/// HTTP methods a [`RestRequest`](crate::RestRequest) can be issued with.
///
/// Besides the standard verbs this covers the WebDAV-style extension methods
/// some REST services still expose.
///
/// ## Examples
///
/// ```rust
/// use resty::RestMethod;
///
/// let method = RestMethod::Get;
/// assert!(!method.has_body());
/// assert!(method.is_idempotent());
///
/// let parsed: RestMethod = "PROPPATCH".parse().unwrap();
/// assert_eq!(parsed, RestMethod::PropPatch);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// HTTP GET - Retrieve a resource.
    #[default]
    Get,
    /// HTTP POST - Create a resource or trigger an action.
    Post,
    /// HTTP PUT - Replace a resource entirely.
    Put,
    /// HTTP PATCH - Partially update a resource.
    Patch,
    /// HTTP DELETE - Remove a resource.
    Delete,
    /// HTTP HEAD - Retrieve headers only.
    Head,
    /// HTTP OPTIONS - Query supported methods.
    Options,
    /// HTTP TRACE - Echo the request for debugging.
    Trace,
    /// HTTP CONNECT - Establish a tunnel.
    Connect,
    /// WebDAV ACL - Modify access control lists.
    Acl,
    /// WebDAV PROPPATCH - Set or remove properties.
    #[strum(serialize = "PROPPATCH")]
    PropPatch,
    /// WebDAV ORDERPATCH - Change member ordering.
    #[strum(serialize = "ORDERPATCH")]
    OrderPatch,
    /// WebDAV SEARCH - Server-side search.
    Search,
}

impl RestMethod {
    /// Returns the method token as sent on the wire.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns `true` if this method typically has a request body.
    pub fn has_body(&self) -> bool {
        matches!(
            self,
            Self::Post | Self::Put | Self::Patch | Self::PropPatch | Self::Acl | Self::OrderPatch
        )
    }

    /// Returns `true` if this method is idempotent.
    ///
    /// POST, PATCH and CONNECT are not idempotent.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Post | Self::Patch | Self::Connect)
    }

    /// Returns `true` if this method is safe (read-only).
    pub fn is_safe(&self) -> bool {
        matches!(
            self,
            Self::Get | Self::Head | Self::Options | Self::Trace | Self::Search
        )
    }

    /// Converts to the equivalent `reqwest::Method`.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::Transport`] if `reqwest` rejects an extension
    /// method token.
    pub fn to_reqwest(self) -> Result<reqwest::Method, ClientError> {
        Ok(match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
            Self::Trace => reqwest::Method::TRACE,
            Self::Connect => reqwest::Method::CONNECT,
            Self::Acl | Self::PropPatch | Self::OrderPatch | Self::Search => {
                reqwest::Method::from_bytes(self.as_str().as_bytes()).map_err(|e| {
                    ClientError::transport(format!("unsupported method {self}"), e)
                })?
            }
        })
    }
}

impl TryFrom<RestMethod> for reqwest::Method {
    type Error = ClientError;

    fn try_from(method: RestMethod) -> Result<Self, Self::Error> {
        method.to_reqwest()
    }
}
