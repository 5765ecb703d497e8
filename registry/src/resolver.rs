//! Definition resolution.
//!
//! Given a closure, find the single definition governing a property or child
//! node. The nearest declaring type wins; among types at the same distance,
//! the leftmost-declared supertype wins, then the first root (primary type
//! before mixins). A value or child-type hint narrows the candidates.

use crate::{ChildNodeDefinition, EffectiveType, PropertyDefinition};
use arbor_core::{Name, RequiredType, Value};

/// Parameters for a property definition lookup.
#[derive(Debug, Clone)]
pub struct PropertyQuery {
    pub name: Name,
    pub value_type: Option<RequiredType>,
    pub multiple: Option<bool>,
    pub include_residual: bool,
    pub skip_protected: bool,
}

impl PropertyQuery {
    /// Look up `name`, falling back to residual definitions.
    pub fn named(name: Name) -> Self {
        Self {
            name,
            value_type: None,
            multiple: None,
            include_residual: true,
            skip_protected: false,
        }
    }

    /// Use the natural type of `value` as the type hint.
    pub fn with_value(self, value: &Value) -> Self {
        self.with_value_type(value.required_type())
    }

    pub fn with_value_type(mut self, value_type: RequiredType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = Some(multiple);
        self
    }

    pub fn exact_only(mut self) -> Self {
        self.include_residual = false;
        self
    }

    pub fn skip_protected(mut self) -> Self {
        self.skip_protected = true;
        self
    }
}

/// Parameters for a child node definition lookup.
#[derive(Debug, Clone)]
pub struct ChildNodeQuery {
    pub name: Name,
    /// Primary type of the child, if known.
    pub primary_type: Option<Name>,
    pub require_same_name_siblings: bool,
    pub include_residual: bool,
    pub skip_protected: bool,
}

impl ChildNodeQuery {
    pub fn named(name: Name) -> Self {
        Self {
            name,
            primary_type: None,
            require_same_name_siblings: false,
            include_residual: true,
            skip_protected: false,
        }
    }

    pub fn with_primary_type(mut self, primary_type: Name) -> Self {
        self.primary_type = Some(primary_type);
        self
    }

    /// Only accept definitions that allow same-name siblings.
    pub fn same_name_siblings(mut self) -> Self {
        self.require_same_name_siblings = true;
        self
    }

    pub fn exact_only(mut self) -> Self {
        self.include_residual = false;
        self
    }

    pub fn skip_protected(mut self) -> Self {
        self.skip_protected = true;
        self
    }
}

impl EffectiveType {
    // ==================== Property Definitions ====================

    /// Every property definition named exactly `name`, in search order.
    pub fn property_definitions_named<'a>(
        &'a self,
        name: &'a Name,
    ) -> impl Iterator<Item = &'a PropertyDefinition> + 'a {
        self.property_definitions().filter(move |d| &d.name == name)
    }

    /// Find the definition governing a property. Absence is not an error.
    pub fn find_property_definition(&self, query: &PropertyQuery) -> Option<&PropertyDefinition> {
        self.find_property_definition_where(query, |_| true)
    }

    /// Like [`find_property_definition`](Self::find_property_definition), but
    /// candidates `accept` rejects are passed over and the search continues.
    /// Callers holding values use this to skip definitions whose constraints
    /// the values do not satisfy.
    pub fn find_property_definition_where(
        &self,
        query: &PropertyQuery,
        accept: impl Fn(&PropertyDefinition) -> bool,
    ) -> Option<&PropertyDefinition> {
        let mut candidates: Vec<&PropertyDefinition> = self
            .property_definitions()
            .filter(|d| d.name == query.name)
            .collect();
        if candidates.is_empty() && query.include_residual {
            candidates = self.property_definitions().filter(|d| d.is_residual()).collect();
        }

        candidates.retain(|d| {
            query.multiple.map_or(true, |m| d.multiple == m)
                && !(query.skip_protected && d.protected)
                && query.value_type.map_or(true, |t| d.required_type.accepts(t))
                && accept(d)
        });

        if let (Some(value_type), true) = (query.value_type, candidates.len() > 1) {
            let mut exact = candidates.iter().filter(|d| d.required_type == value_type);
            if let (Some(only), None) = (exact.next(), exact.next()) {
                tracing::debug!(property = %query.name, declaring_type = %only.declaring_type, "resolved by exact type");
                return Some(*only);
            }
        }

        let found = candidates.first().copied();
        if let Some(definition) = found {
            tracing::debug!(property = %query.name, declaring_type = %definition.declaring_type, "resolved property definition");
        }
        found
    }

    // ==================== Child Node Definitions ====================

    /// Every child node definition named exactly `name`, in search order.
    pub fn child_node_definitions_named<'a>(
        &'a self,
        name: &'a Name,
    ) -> impl Iterator<Item = &'a ChildNodeDefinition> + 'a {
        self.child_node_definitions().filter(move |d| &d.name == name)
    }

    /// Find the definition governing a child node. Absence is not an error.
    pub fn find_child_node_definition(&self, query: &ChildNodeQuery) -> Option<&ChildNodeDefinition> {
        let mut candidates: Vec<&ChildNodeDefinition> = self
            .child_node_definitions()
            .filter(|d| d.name == query.name)
            .collect();
        if candidates.is_empty() && query.include_residual {
            candidates = self.child_node_definitions().filter(|d| d.is_residual()).collect();
        }

        candidates.retain(|d| {
            (!query.require_same_name_siblings || d.same_name_siblings)
                && !(query.skip_protected && d.protected)
                && query
                    .primary_type
                    .as_ref()
                    .map_or(true, |t| self.allows_child_type(d, t))
        });

        if let (Some(primary_type), true) = (&query.primary_type, candidates.len() > 1) {
            let mut exact = candidates
                .iter()
                .filter(|d| d.required_primary_types.contains(primary_type));
            if let (Some(only), None) = (exact.next(), exact.next()) {
                return Some(*only);
            }
        }

        candidates.first().copied()
    }

    /// True when a child of type `child_type` satisfies every required
    /// primary type of `definition`.
    pub fn allows_child_type(&self, definition: &ChildNodeDefinition, child_type: &Name) -> bool {
        let table = self.table();
        table.contains(child_type)
            && definition
                .required_primary_types
                .iter()
                .all(|required| table.is_node_type(child_type, required))
    }
}
