//! Arbor Core Types
//!
//! This crate provides the foundational types shared by the schema engine:
//! - Qualified names and the namespace context used to resolve prefixes
//! - Repository paths
//! - Property values and the closed set of required types
//! - Common error types

mod error;
mod name;
mod namespace;
mod path;
mod value;

pub use error::*;
pub use name::*;
pub use namespace::*;
pub use path::*;
pub use value::*;
