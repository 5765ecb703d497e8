//! Registry error types.

use arbor_core::{CoreError, Name};
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// The structural error kinds surfaced by the schema engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SchemaNotFound,
    InvalidDefinition,
    IllegalOverride,
    StructuralConflict,
}

/// Errors that can occur while registering or resolving node types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Node type not found: {0}")]
    UnknownType(Name),

    #[error("Node type {node_type} references unknown type {missing}")]
    SchemaNotFound { node_type: Name, missing: Name },

    #[error("Invalid definition in node type {node_type}: {reason}")]
    InvalidDefinition { node_type: Name, reason: String },

    #[error("Illegal override of {item} in node type {node_type}: {reason}")]
    IllegalOverride {
        node_type: Name,
        item: Name,
        reason: String,
    },

    #[error("Node type already registered: {0}")]
    AlreadyRegistered(Name),

    #[error("Unknown on-parent-version behavior: {0}")]
    UnknownOnParentVersion(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RegistryError {
    pub fn schema_not_found(node_type: &Name, missing: &Name) -> Self {
        Self::SchemaNotFound {
            node_type: node_type.clone(),
            missing: missing.clone(),
        }
    }

    pub fn invalid_definition(node_type: &Name, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            node_type: node_type.clone(),
            reason: reason.into(),
        }
    }

    pub fn illegal_override(node_type: &Name, item: &Name, reason: impl Into<String>) -> Self {
        Self::IllegalOverride {
            node_type: node_type.clone(),
            item: item.clone(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::UnknownType(_) | RegistryError::SchemaNotFound { .. } => {
                ErrorKind::SchemaNotFound
            }
            RegistryError::IllegalOverride { .. } => ErrorKind::IllegalOverride,
            RegistryError::InvalidDefinition { .. }
            | RegistryError::AlreadyRegistered(_)
            | RegistryError::UnknownOnParentVersion(_)
            | RegistryError::Core(_) => ErrorKind::InvalidDefinition,
        }
    }
}
