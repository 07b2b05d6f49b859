//! MIME type to strategy mapping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{RequestSerializer, ResponseDeserializer};
use crate::content_type::{essence_of, ContentType};

/// Request-side registry keyed by the request's content type.
pub type SerializerRegistry = Registry<dyn RequestSerializer>;

/// Response-side registry keyed by the response's declared content type.
pub type DeserializerRegistry = Registry<dyn ResponseDeserializer>;

/// A mapping from normalized MIME type to a shared strategy.
///
/// Keys are stored by their essence, so `application/json; charset=utf-8`
/// and `Application/JSON` resolve the same entry. Registering a key twice
/// replaces the earlier strategy. A lookup miss is `None`; deciding whether
/// that is an error is up to the caller.
pub struct Registry<S: ?Sized> {
    entries: HashMap<String, Arc<S>>,
}

impl<S: ?Sized> Registry<S> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Binds `strategy` to `content_type`, returning the strategy it replaced.
    pub fn register(&mut self, content_type: &ContentType, strategy: Arc<S>) -> Option<Arc<S>> {
        let key = content_type.essence();
        let replaced = self.entries.insert(key.clone(), strategy);
        if replaced.is_some() {
            debug!(content_type = %key, "replaced registered strategy");
        } else {
            debug!(content_type = %key, "registered strategy");
        }
        replaced
    }

    /// Looks up the strategy for a raw content type value.
    pub fn resolve(&self, content_type: &str) -> Option<Arc<S>> {
        self.entries.get(&essence_of(content_type)).cloned()
    }

    /// Returns `true` if a strategy is bound to `content_type`.
    pub fn contains(&self, content_type: &str) -> bool {
        self.entries.contains_key(&essence_of(content_type))
    }

    /// Returns the registered keys in no particular order.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: ?Sized> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("Registry").field("content_types", &keys).finish()
    }
}
