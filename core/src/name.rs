//! Qualified names.
//!
//! A name is always stored in resolved form: the namespace URI plus the local
//! part. Prefixed forms (`nt:base`) only exist at the string boundary and are
//! turned into names through a [`NamespaceContext`].

use crate::{CoreError, CoreResult, NamespaceContext, JCR_URI, MIX_URI, NT_URI};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The local part of the residual (wildcard) name.
pub const RESIDUAL: &str = "*";

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name {
    namespace: String,
    local: String,
}

impl Name {
    /// Create a name from a namespace URI and a local part.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a name in the default (empty) namespace.
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new("", local)
    }

    /// The residual name `*`, matching any name not declared explicitly.
    pub fn residual() -> Self {
        Self::new("", RESIDUAL)
    }

    pub fn jcr(local: impl Into<String>) -> Self {
        Self::new(JCR_URI, local)
    }

    pub fn nt(local: impl Into<String>) -> Self {
        Self::new(NT_URI, local)
    }

    pub fn mix(local: impl Into<String>) -> Self {
        Self::new(MIX_URI, local)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn is_residual(&self) -> bool {
        self.namespace.is_empty() && self.local == RESIDUAL
    }

    /// Parse a name written as `prefix:local`, `{uri}local` or `local`.
    ///
    /// Prefixes are resolved through `context` at call time.
    pub fn parse(text: &str, context: &dyn NamespaceContext) -> CoreResult<Name> {
        if let Some(rest) = text.strip_prefix('{') {
            let (uri, local) = rest
                .split_once('}')
                .ok_or_else(|| CoreError::invalid_name(text, "unterminated namespace"))?;
            validate_local(text, local)?;
            return Ok(Name::new(uri, local));
        }

        let (prefix, local) = match text.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", text),
        };
        validate_local(text, local)?;
        if local == RESIDUAL {
            if !prefix.is_empty() {
                return Err(CoreError::invalid_name(text, "residual name cannot be prefixed"));
            }
            return Ok(Name::residual());
        }
        let uri = context
            .namespace_for_prefix(prefix)
            .ok_or_else(|| CoreError::unknown_prefix(prefix))?;
        Ok(Name::new(uri, local))
    }

    /// Render the name in `prefix:local` form using the current prefix mapping.
    pub fn to_prefixed(&self, context: &dyn NamespaceContext) -> CoreResult<String> {
        if self.namespace.is_empty() {
            return Ok(self.local.clone());
        }
        let prefix = context
            .prefix_for_namespace(&self.namespace)
            .ok_or_else(|| CoreError::unmapped_namespace(&self.namespace))?;
        if prefix.is_empty() {
            Ok(self.local.clone())
        } else {
            Ok(format!("{}:{}", prefix, self.local))
        }
    }
}

fn validate_local(text: &str, local: &str) -> CoreResult<()> {
    if local.is_empty() {
        return Err(CoreError::invalid_name(text, "empty local name"));
    }
    if local == RESIDUAL {
        return Ok(());
    }
    if let Some(c) = local
        .chars()
        .find(|c| matches!(c, '/' | ':' | '[' | ']' | '|' | '*' | '{' | '}'))
    {
        return Err(CoreError::invalid_name(
            text,
            format!("illegal character '{}'", c),
        ));
    }
    if local.trim() != local {
        return Err(CoreError::invalid_name(text, "leading or trailing whitespace"));
    }
    Ok(())
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}
