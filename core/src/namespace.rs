//! Namespace prefix mappings.
//!
//! The schema engine never owns the mapping between prefixes and namespace
//! URIs. It consumes a [`NamespaceContext`] and asks it on every call, since
//! the mapping may change at any time.

use crate::{CoreError, CoreResult, Name};
use parking_lot::RwLock;
use std::collections::HashMap;

pub const JCR_URI: &str = "http://www.jcp.org/jcr/1.0";
pub const NT_URI: &str = "http://www.jcp.org/jcr/nt/1.0";
pub const MIX_URI: &str = "http://www.jcp.org/jcr/mix/1.0";
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

const RESERVED_PREFIXES: [&str; 4] = ["jcr", "nt", "mix", "xml"];

/// A live mapping between namespace prefixes and URIs.
pub trait NamespaceContext {
    /// The URI currently bound to `prefix`, if any.
    fn namespace_for_prefix(&self, prefix: &str) -> Option<String>;

    /// The prefix currently bound to `uri`, if any.
    fn prefix_for_namespace(&self, uri: &str) -> Option<String>;

    /// Resolve a `prefix:local` string into a [`Name`].
    fn parse_name(&self, text: &str) -> CoreResult<Name>
    where
        Self: Sized,
    {
        Name::parse(text, self)
    }
}

/// In-memory namespace registry seeded with the built-in prefixes.
#[derive(Debug)]
pub struct NamespaceRegistry {
    prefixes: RwLock<HashMap<String, String>>,
}

impl NamespaceRegistry {
    /// Create a registry holding the built-in `jcr`, `nt`, `mix`, `xml` and
    /// empty-prefix mappings.
    pub fn new() -> Self {
        let mut prefixes = HashMap::new();
        prefixes.insert(String::new(), String::new());
        prefixes.insert("jcr".to_string(), JCR_URI.to_string());
        prefixes.insert("nt".to_string(), NT_URI.to_string());
        prefixes.insert("mix".to_string(), MIX_URI.to_string());
        prefixes.insert("xml".to_string(), XML_URI.to_string());
        Self {
            prefixes: RwLock::new(prefixes),
        }
    }

    /// Bind `prefix` to `uri`, replacing any previous binding of either.
    pub fn register(&self, prefix: impl Into<String>, uri: impl Into<String>) -> CoreResult<()> {
        let prefix = prefix.into();
        let uri = uri.into();
        if RESERVED_PREFIXES.contains(&prefix.as_str()) || prefix.is_empty() {
            return Err(CoreError::invalid_name(prefix, "reserved namespace prefix"));
        }
        if prefix.contains(':') || prefix.contains('/') {
            return Err(CoreError::invalid_name(prefix, "illegal character in prefix"));
        }
        let mut prefixes = self.prefixes.write();
        prefixes.retain(|p, u| p.is_empty() || *u != uri);
        prefixes.insert(prefix, uri);
        Ok(())
    }

    /// Remove the binding for `prefix`. Returns the URI it was bound to.
    pub fn unregister(&self, prefix: &str) -> Option<String> {
        if RESERVED_PREFIXES.contains(&prefix) || prefix.is_empty() {
            return None;
        }
        self.prefixes.write().remove(prefix)
    }

    pub fn prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.prefixes.read().keys().cloned().collect();
        prefixes.sort();
        prefixes
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext for NamespaceRegistry {
    fn namespace_for_prefix(&self, prefix: &str) -> Option<String> {
        self.prefixes.read().get(prefix).cloned()
    }

    fn prefix_for_namespace(&self, uri: &str) -> Option<String> {
        self.prefixes
            .read()
            .iter()
            .find(|(_, u)| u.as_str() == uri)
            .map(|(p, _)| p.clone())
    }
}

/// Session-style overlay of local prefix remappings on top of a shared
/// context. Local prefixes take precedence; everything else falls through.
pub struct LocalNamespaces<'a> {
    parent: &'a dyn NamespaceContext,
    local: RwLock<HashMap<String, String>>,
}

impl<'a> LocalNamespaces<'a> {
    pub fn new(parent: &'a dyn NamespaceContext) -> Self {
        Self {
            parent,
            local: RwLock::new(HashMap::new()),
        }
    }

    /// Make `prefix` an alias for `uri` within this overlay.
    pub fn set_prefix(&self, prefix: impl Into<String>, uri: impl Into<String>) -> CoreResult<()> {
        let prefix = prefix.into();
        let uri = uri.into();
        if prefix == "xml" || prefix.is_empty() {
            return Err(CoreError::invalid_name(prefix, "reserved namespace prefix"));
        }
        let mut local = self.local.write();
        local.retain(|_, u| *u != uri);
        local.insert(prefix, uri);
        Ok(())
    }
}

impl NamespaceContext for LocalNamespaces<'_> {
    fn namespace_for_prefix(&self, prefix: &str) -> Option<String> {
        if let Some(uri) = self.local.read().get(prefix) {
            return Some(uri.clone());
        }
        self.parent.namespace_for_prefix(prefix)
    }

    fn prefix_for_namespace(&self, uri: &str) -> Option<String> {
        let local = self.local.read();
        if let Some((prefix, _)) = local.iter().find(|(_, u)| u.as_str() == uri) {
            return Some(prefix.clone());
        }
        self.parent
            .prefix_for_namespace(uri)
            .filter(|prefix| !local.contains_key(prefix))
    }
}
