//! Arbor Constraint
//!
//! Evaluates the value constraints attached to property definitions.
//! Constraints are stored as raw strings and interpreted per required type
//! on every evaluation, against the namespace mapping in effect at call time.

mod check;
mod error;
mod evaluator;
mod range;

pub use check::*;
pub use error::*;
pub use evaluator::*;
pub use range::*;
