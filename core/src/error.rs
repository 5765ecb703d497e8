//! Core error types.

use crate::RequiredType;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while parsing names, paths and values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Unknown namespace prefix: {prefix}")]
    UnknownPrefix { prefix: String },

    #[error("No prefix is mapped to namespace {uri}")]
    UnmappedNamespace { uri: String },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid date: {text}")]
    InvalidDate { text: String },

    #[error("Unknown property type: {0}")]
    UnknownRequiredType(String),

    #[error("Cannot convert {from} value '{value}' to {to}")]
    ValueConversion {
        from: RequiredType,
        to: RequiredType,
        value: String,
    },
}

impl CoreError {
    pub fn unknown_prefix(prefix: impl Into<String>) -> Self {
        Self::UnknownPrefix {
            prefix: prefix.into(),
        }
    }

    pub fn unmapped_namespace(uri: impl Into<String>) -> Self {
        Self::UnmappedNamespace { uri: uri.into() }
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_date(text: impl Into<String>) -> Self {
        Self::InvalidDate { text: text.into() }
    }

    pub fn conversion(from: RequiredType, to: RequiredType, value: impl Into<String>) -> Self {
        Self::ValueConversion {
            from,
            to,
            value: value.into(),
        }
    }
}
