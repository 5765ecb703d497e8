//! Arbor Mixin
//!
//! Decides whether a mixin type can be attached to or detached from a node
//! without leaving the node's existing content ungoverned, and performs the
//! change on a [`NodeState`].

mod config;
mod engine;
mod error;
mod node;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use node::*;
