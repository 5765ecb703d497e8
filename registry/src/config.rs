//! Registration configuration.

use arbor_core::Name;
use serde::{Deserialize, Serialize};

/// Options controlling how node types are registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Allow a candidate to replace an already registered type of the same name.
    pub allow_updates: bool,
    /// Supertype added to primary types that declare none.
    pub implicit_base_type: Option<Name>,
    /// Check that default values match the required type.
    pub validate_default_values: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            allow_updates: false,
            implicit_base_type: None,
            validate_default_values: true,
        }
    }
}

impl RegistryConfig {
    /// Defaults matching a JCR repository: every primary type extends `nt:base`.
    pub fn jcr() -> Self {
        Self {
            implicit_base_type: Some(Name::nt("base")),
            ..Self::default()
        }
    }

    pub fn allow_updates(mut self) -> Self {
        self.allow_updates = true;
        self
    }

    pub fn with_implicit_base_type(mut self, name: Option<Name>) -> Self {
        self.implicit_base_type = name;
        self
    }
}
