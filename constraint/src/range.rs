//! Interval constraints.
//!
//! LONG, DOUBLE, DATE and BINARY constraints are written as intervals:
//! `[lo,hi]` is closed, `(lo,hi)` open, and the two may be mixed. An empty
//! bound is unbounded on that side.

use crate::{ConstraintError, ConstraintResult};
use arbor_core::RequiredType;

/// One end of an interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound<T> {
    pub value: T,
    pub inclusive: bool,
}

/// A parsed interval over `T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub lower: Option<Bound<T>>,
    pub upper: Option<Bound<T>>,
}

impl<T: PartialOrd> Range<T> {
    /// Parse `text`, converting each non-empty bound with `parse_bound`.
    pub fn parse<F>(text: &str, required_type: RequiredType, parse_bound: F) -> ConstraintResult<Self>
    where
        F: Fn(&str) -> Option<T>,
    {
        let invalid = |reason: &str| ConstraintError::invalid(text, required_type, reason);
        let trimmed = text.trim();

        let lower_inclusive = match trimmed.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(invalid("expected '[' or '('")),
        };
        let upper_inclusive = match trimmed.chars().last() {
            Some(']') if trimmed.len() > 1 => true,
            Some(')') if trimmed.len() > 1 => false,
            _ => return Err(invalid("expected ']' or ')'")),
        };

        let body = &trimmed[1..trimmed.len() - 1];
        let (lo, hi) = body
            .split_once(',')
            .ok_or_else(|| invalid("expected a ',' between the bounds"))?;
        if hi.contains(',') {
            return Err(invalid("too many bounds"));
        }

        let bound = |part: &str, inclusive: bool| -> ConstraintResult<Option<Bound<T>>> {
            let part = part.trim();
            if part.is_empty() {
                return Ok(None);
            }
            parse_bound(part)
                .map(|value| Some(Bound { value, inclusive }))
                .ok_or_else(|| invalid(&format!("'{}' is not a valid {} bound", part, required_type)))
        };

        Ok(Self {
            lower: bound(lo, lower_inclusive)?,
            upper: bound(hi, upper_inclusive)?,
        })
    }

    /// Check whether `value` lies within the interval.
    pub fn contains(&self, value: &T) -> bool {
        let above = match &self.lower {
            Some(Bound { value: lo, inclusive: true }) => value >= lo,
            Some(Bound { value: lo, inclusive: false }) => value > lo,
            None => true,
        };
        let below = match &self.upper {
            Some(Bound { value: hi, inclusive: true }) => value <= hi,
            Some(Bound { value: hi, inclusive: false }) => value < hi,
            None => true,
        };
        above && below
    }
}
