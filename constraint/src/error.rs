//! Constraint errors.

use arbor_core::{CoreError, RequiredType};
use arbor_registry::ErrorKind;
use thiserror::Error;

/// Result type for constraint operations.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Errors raised while interpreting constraint strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("Invalid {required_type} constraint '{constraint}': {reason}")]
    InvalidConstraint {
        constraint: String,
        required_type: RequiredType,
        reason: String,
    },

    #[error("Default value '{value}' does not satisfy the constraints")]
    DefaultNotSatisfied { value: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ConstraintError {
    pub fn invalid(
        constraint: impl Into<String>,
        required_type: RequiredType,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConstraint {
            constraint: constraint.into(),
            required_type,
            reason: reason.into(),
        }
    }

    /// Every constraint error makes a definition unacceptable.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidDefinition
    }
}
