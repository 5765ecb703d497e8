//! Mixin composition errors.

use arbor_core::Name;
use arbor_registry::{ErrorKind, RegistryError};
use thiserror::Error;

/// Result type for mixin operations.
pub type MixinResult<T> = Result<T, MixinError>;

/// Reasons a mixin cannot be added or removed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MixinError {
    #[error("Mixin {mixin} conflicts with the node's structure: {reason}")]
    StructuralConflict { mixin: Name, reason: String },

    #[error("Node type {0} is not a mixin")]
    NotMixin(Name),

    #[error("Mixin {0} is already part of the node's type")]
    MixinAlreadyPresent(Name),

    #[error("Mixin {0} is not assigned to the node")]
    MixinNotPresent(Name),

    #[error("Cannot change mixin {0}: the node is protected")]
    ProtectedNode(Name),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl MixinError {
    pub fn conflict(mixin: &Name, reason: impl Into<String>) -> Self {
        Self::StructuralConflict {
            mixin: mixin.clone(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MixinError::Registry(e) => e.kind(),
            _ => ErrorKind::StructuralConflict,
        }
    }
}
