//! Constraint evaluation.

use crate::{ConstraintError, ConstraintResult, Range};
use arbor_core::{parse_date, Name, NamespaceContext, Path, RequiredType, Value};
use arbor_registry::{PropertyDefinition, TypeTable};
use chrono::{DateTime, FixedOffset};
use regex_lite::Regex;
use std::sync::Arc;

/// The node types of a referenced node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedNode {
    pub primary_type: Name,
    pub mixins: Vec<Name>,
}

/// Looks up the node behind a REFERENCE value.
pub trait ReferenceResolver {
    fn resolve(&self, identifier: &str) -> Option<ReferencedNode>;
}

/// A constraint string interpreted for one required type.
#[derive(Debug, Clone)]
pub enum Constraint {
    Long(Range<i64>),
    /// Interval over the byte length of the value.
    Binary(Range<i64>),
    Double(Range<f64>),
    Date(Range<DateTime<FixedOffset>>),
    Pattern(Regex),
    Name(Name),
    /// The path itself or anything below it (`/a/b/*`).
    Subtree(Path),
    Exact(Path),
    /// Matches the last segment of the value (a constraint without `/`).
    LastSegment(Name),
    Reference(Name),
    /// Constraints are not meaningful for this type.
    Any,
}

impl Constraint {
    /// Interpret `text` for `required_type`, resolving prefixes through
    /// `context` as it is right now.
    pub fn compile(
        text: &str,
        required_type: RequiredType,
        context: &dyn NamespaceContext,
    ) -> ConstraintResult<Self> {
        let invalid = |reason: String| ConstraintError::invalid(text, required_type, reason);
        Ok(match required_type {
            RequiredType::Long => Constraint::Long(Range::parse(text, required_type, |s| s.parse().ok())?),
            RequiredType::Binary => {
                Constraint::Binary(Range::parse(text, required_type, |s| s.parse().ok())?)
            }
            RequiredType::Double => Constraint::Double(Range::parse(text, required_type, |s| {
                s.parse::<f64>().ok().filter(|v| !v.is_nan())
            })?),
            RequiredType::Date => {
                Constraint::Date(Range::parse(text, required_type, |s| parse_date(s).ok())?)
            }
            RequiredType::String => Constraint::Pattern(
                Regex::new(&format!("^(?:{})$", text)).map_err(|e| invalid(e.to_string()))?,
            ),
            RequiredType::Name => Constraint::Name(Name::parse(text.trim(), context)?),
            RequiredType::Path => compile_path(text.trim(), context)?,
            RequiredType::Reference => Constraint::Reference(Name::parse(text.trim(), context)?),
            RequiredType::Boolean | RequiredType::Undefined => Constraint::Any,
        })
    }
}

fn compile_path(text: &str, context: &dyn NamespaceContext) -> ConstraintResult<Constraint> {
    if let Some(prefix) = text.strip_suffix("/*") {
        let base = if prefix.is_empty() {
            Path::root()
        } else {
            Path::parse(prefix, context)?
        };
        return Ok(Constraint::Subtree(base.normalize()?));
    }
    if !text.contains('/') {
        return Ok(Constraint::LastSegment(Name::parse(text, context)?));
    }
    Ok(Constraint::Exact(Path::parse(text, context)?.normalize()?))
}

/// Checks values against the constraints of a property definition.
///
/// A definition's constraints are alternatives: a value satisfies the
/// definition when it matches any of them.
#[derive(Clone)]
pub struct ConstraintEvaluator {
    table: Arc<TypeTable>,
    references: Option<Arc<dyn ReferenceResolver + Send + Sync>>,
}

impl ConstraintEvaluator {
    /// Create an evaluator that checks REFERENCE constraints against `table`.
    pub fn new(table: Arc<TypeTable>) -> Self {
        Self {
            table,
            references: None,
        }
    }

    pub fn with_references(mut self, resolver: Arc<dyn ReferenceResolver + Send + Sync>) -> Self {
        self.references = Some(resolver);
        self
    }

    /// Check a single value. A missing value never satisfies.
    pub fn satisfies(
        &self,
        definition: &PropertyDefinition,
        value: Option<&Value>,
        context: &dyn NamespaceContext,
    ) -> bool {
        let Some(value) = value else {
            return false;
        };
        if definition.constraints.is_empty() {
            return true;
        }
        let required_type = definition.required_type;
        if matches!(required_type, RequiredType::Boolean | RequiredType::Undefined) {
            return true;
        }

        let value = match value.convert_to(required_type, context) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(property = %definition.name, error = %e, "value does not convert to the required type");
                return false;
            }
        };

        definition.constraints.iter().any(|text| {
            match Constraint::compile(text, required_type, context) {
                Ok(constraint) => self.matches(&constraint, &value),
                Err(e) => {
                    tracing::warn!(property = %definition.name, error = %e, "skipping unreadable constraint");
                    false
                }
            }
        })
    }

    /// Check every value of a multi-valued property. An empty list satisfies.
    pub fn satisfies_all(
        &self,
        definition: &PropertyDefinition,
        values: &[Value],
        context: &dyn NamespaceContext,
    ) -> bool {
        values
            .iter()
            .all(|value| self.satisfies(definition, Some(value), context))
    }

    /// Check that every constraint of `definition` can be interpreted.
    pub fn check_syntax(
        &self,
        definition: &PropertyDefinition,
        context: &dyn NamespaceContext,
    ) -> ConstraintResult<()> {
        for text in &definition.constraints {
            Constraint::compile(text, definition.required_type, context)?;
        }
        Ok(())
    }

    /// Match an already converted value against one constraint.
    pub fn matches(&self, constraint: &Constraint, value: &Value) -> bool {
        match (constraint, value) {
            (Constraint::Long(range), Value::Long(v)) => range.contains(v),
            (Constraint::Binary(range), Value::Binary(bytes)) => {
                i64::try_from(bytes.len()).map_or(false, |len| range.contains(&len))
            }
            (Constraint::Double(range), Value::Double(v)) => range.contains(v),
            (Constraint::Date(range), Value::Date(d)) => range.contains(d),
            (Constraint::Pattern(regex), Value::String(s)) => regex.is_match(s),
            (Constraint::Name(name), Value::Name(v)) => name == v,
            (Constraint::Subtree(base), Value::Path(p)) => p.is_at_or_below(base),
            (Constraint::Exact(expected), Value::Path(p)) => {
                p.normalize().map_or(false, |p| &p == expected)
            }
            (Constraint::LastSegment(name), Value::Path(p)) => p
                .normalize()
                .ok()
                .and_then(|p| p.last_segment().and_then(|s| s.name()).cloned())
                .map_or(false, |last| &last == name),
            (Constraint::Reference(node_type), Value::Reference(id)) => self.references_node_type(id, node_type),
            (Constraint::Any, _) => true,
            _ => false,
        }
    }

    fn references_node_type(&self, identifier: &str, node_type: &Name) -> bool {
        let Some(resolver) = &self.references else {
            tracing::debug!(reference = identifier, "no reference resolver; constraint not satisfied");
            return false;
        };
        let Some(target) = resolver.resolve(identifier) else {
            return false;
        };
        std::iter::once(&target.primary_type)
            .chain(&target.mixins)
            .any(|t| self.table.is_node_type(t, node_type))
    }
}

impl std::fmt::Debug for ConstraintEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintEvaluator")
            .field("types", &self.table.len())
            .field("references", &self.references.is_some())
            .finish()
    }
}
