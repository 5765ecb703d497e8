//! Arbor Registry
//!
//! Node type definitions and everything that works on the type graph alone:
//! - The copy-on-write type store
//! - Effective type closures and definition resolution
//! - Registration validation (supertypes, residual rules, override narrowing)
//! - The built-in node types

mod builtins;
mod closure;
mod config;
mod error;
mod resolver;
mod store;
mod types;
mod validator;

pub use builtins::*;
pub use closure::*;
pub use config::*;
pub use error::*;
pub use resolver::*;
pub use store::*;
pub use types::*;
pub use validator::*;
