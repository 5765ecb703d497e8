//! Registration validation.
//!
//! Candidates are validated one at a time, in batch order, against the
//! current contents of the store. Each accepted candidate is committed
//! before the next is examined, so a batch must list supertypes before the
//! types that extend them. A failure aborts only the failing candidate.

use crate::{
    ChildNodeDefinition, EffectiveType, NodeTypeDefinition, PropertyDefinition, RegistryConfig,
    RegistryError, RegistryResult, TypeStore, TypeTable,
};
use arbor_core::{Name, RequiredType};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// An additional check applied to every declared property definition.
///
/// Returns the reason when the definition is unacceptable.
pub trait DefinitionCheck {
    fn check_property(&self, definition: &PropertyDefinition) -> Result<(), String>;
}

/// True when a definition requiring `candidate` may override one requiring
/// `inherited`. UNDEFINED narrows to anything; a concrete type only to itself.
pub fn narrows_required_type(inherited: RequiredType, candidate: RequiredType) -> bool {
    inherited == RequiredType::Undefined || inherited == candidate
}

/// True when every inherited required primary type is satisfied by some
/// type in `candidate`, using `is_a(sub, sup)` for subtyping.
pub fn narrows_required_primary_types(
    inherited: &[Name],
    candidate: &[Name],
    is_a: impl Fn(&Name, &Name) -> bool,
) -> bool {
    inherited
        .iter()
        .all(|required| candidate.iter().any(|c| is_a(c, required)))
}

/// True when `candidate` constraints are the same as or tighter than
/// `inherited`: an unconstrained definition accepts anything, otherwise the
/// overriding list must be a non-empty subset.
pub fn constraints_tighten(inherited: &[String], candidate: &[String]) -> bool {
    inherited.is_empty()
        || (!candidate.is_empty() && candidate.iter().all(|c| inherited.contains(c)))
}

/// Validates node type candidates and commits them to a [`TypeStore`].
pub struct RegistrationValidator {
    config: RegistryConfig,
    checks: Vec<Box<dyn DefinitionCheck + Send + Sync>>,
}

impl RegistrationValidator {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            checks: Vec::new(),
        }
    }

    /// Add a check run against every declared property definition.
    pub fn with_check(mut self, check: impl DefinitionCheck + Send + Sync + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ==================== Registration ====================

    /// Validate and commit each candidate in order.
    ///
    /// Candidates committed before a failing one stay committed.
    pub fn register_batch(
        &self,
        store: &TypeStore,
        candidates: Vec<NodeTypeDefinition>,
    ) -> RegistryResult<Vec<Arc<NodeTypeDefinition>>> {
        let _writer = store.lock_writes();
        let mut committed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match self.commit(store, candidate) {
                Ok(definition) => committed.push(definition),
                Err(e) => {
                    tracing::warn!(committed = committed.len(), error = %e, "node type batch aborted");
                    return Err(e);
                }
            }
        }
        Ok(committed)
    }

    /// Validate and commit a single candidate.
    pub fn register(
        &self,
        store: &TypeStore,
        candidate: NodeTypeDefinition,
    ) -> RegistryResult<Arc<NodeTypeDefinition>> {
        let _writer = store.lock_writes();
        self.commit(store, candidate)
    }

    fn commit(
        &self,
        store: &TypeStore,
        candidate: NodeTypeDefinition,
    ) -> RegistryResult<Arc<NodeTypeDefinition>> {
        let candidate = self.prepare(candidate);
        let table = store.snapshot();
        if let Err(e) = self.validate(&table, &candidate) {
            tracing::warn!(node_type = %candidate.name, error = %e, "rejected node type");
            return Err(e);
        }
        let replaced = table.contains(&candidate.name);
        let definition = store.publish(candidate);
        tracing::info!(node_type = %definition.name, replaced, "registered node type");
        Ok(definition)
    }

    /// Apply the implicit base type and stamp declaring types.
    fn prepare(&self, mut candidate: NodeTypeDefinition) -> NodeTypeDefinition {
        if let Some(base) = &self.config.implicit_base_type {
            if !candidate.is_mixin && candidate.supertypes.is_empty() && &candidate.name != base {
                candidate.supertypes.push(base.clone());
            }
        }
        for definition in &mut candidate.property_definitions {
            definition.declaring_type = candidate.name.clone();
        }
        for definition in &mut candidate.child_node_definitions {
            definition.declaring_type = candidate.name.clone();
        }
        candidate
    }

    // ==================== Validation ====================

    /// Check `candidate` against `table` without committing it.
    pub fn validate(&self, table: &Arc<TypeTable>, candidate: &NodeTypeDefinition) -> RegistryResult<()> {
        self.check_identity(table, candidate)?;
        self.check_supertypes(table, candidate)?;
        self.check_declared_properties(candidate)?;
        self.check_declared_child_nodes(table, candidate)?;

        let inherited = EffectiveType::of_supertypes(table, &candidate.supertypes);
        self.check_property_overrides(candidate, &inherited)?;
        self.check_child_node_overrides(table, candidate, &inherited)?;
        self.check_diamonds(table, candidate, &inherited)?;
        self.check_primary_item(candidate, &inherited)?;
        Ok(())
    }

    fn check_identity(&self, table: &TypeTable, candidate: &NodeTypeDefinition) -> RegistryResult<()> {
        if candidate.name.is_residual() {
            return Err(RegistryError::invalid_definition(
                &candidate.name,
                "a node type cannot use the residual name",
            ));
        }
        if table.contains(&candidate.name) && !self.config.allow_updates {
            return Err(RegistryError::AlreadyRegistered(candidate.name.clone()));
        }
        Ok(())
    }

    fn check_supertypes(&self, table: &TypeTable, candidate: &NodeTypeDefinition) -> RegistryResult<()> {
        let mut seen = HashSet::new();
        for supertype in &candidate.supertypes {
            if supertype == &candidate.name {
                return Err(RegistryError::invalid_definition(
                    &candidate.name,
                    "a node type cannot extend itself",
                ));
            }
            if !seen.insert(supertype) {
                return Err(RegistryError::invalid_definition(
                    &candidate.name,
                    format!("supertype {} is listed twice", supertype),
                ));
            }
            if !table.contains(supertype) {
                return Err(RegistryError::schema_not_found(&candidate.name, supertype));
            }
            if table.is_node_type(supertype, &candidate.name) {
                return Err(RegistryError::invalid_definition(
                    &candidate.name,
                    format!("supertype {} already extends this type", supertype),
                ));
            }
        }
        Ok(())
    }

    fn check_declared_properties(&self, candidate: &NodeTypeDefinition) -> RegistryResult<()> {
        let node_type = &candidate.name;
        let mut keys = HashSet::new();
        for definition in &candidate.property_definitions {
            let invalid = |reason: String| {
                RegistryError::invalid_definition(node_type, format!("property {}: {}", definition.name, reason))
            };

            if !keys.insert(definition.key()) {
                return Err(invalid("declared more than once".to_string()));
            }
            if definition.is_residual() && definition.mandatory {
                return Err(invalid("a residual definition cannot be mandatory".to_string()));
            }
            if definition.is_residual() && definition.auto_created {
                return Err(invalid("a residual definition cannot be auto-created".to_string()));
            }
            if definition.auto_created && !definition.protected && definition.default_values.is_empty() {
                return Err(invalid("auto-created definitions need a default value".to_string()));
            }
            if !definition.multiple && definition.default_values.len() > 1 {
                return Err(invalid("a single-valued definition has at most one default".to_string()));
            }
            if self.config.validate_default_values {
                if let Some(value) = definition
                    .default_values
                    .iter()
                    .find(|v| !definition.required_type.accepts(v.required_type()))
                {
                    return Err(invalid(format!(
                        "default value of type {} does not match {}",
                        value.required_type(),
                        definition.required_type
                    )));
                }
            }
            for check in &self.checks {
                check.check_property(definition).map_err(&invalid)?;
            }
        }
        Ok(())
    }

    fn check_declared_child_nodes(
        &self,
        table: &TypeTable,
        candidate: &NodeTypeDefinition,
    ) -> RegistryResult<()> {
        let node_type = &candidate.name;
        let mut keys = HashSet::new();
        for definition in &candidate.child_node_definitions {
            let invalid = |reason: &str| {
                RegistryError::invalid_definition(node_type, format!("child node {}: {}", definition.name, reason))
            };

            if !keys.insert(definition.key()) {
                return Err(invalid("declared more than once"));
            }
            if definition.is_residual() && definition.mandatory {
                return Err(invalid("a residual definition cannot be mandatory"));
            }
            if definition.is_residual() && definition.auto_created {
                return Err(invalid("a residual definition cannot be auto-created"));
            }
            if definition.auto_created && !definition.protected && definition.default_primary_type.is_none() {
                return Err(invalid("auto-created definitions need a default primary type"));
            }

            for required in &definition.required_primary_types {
                if required != node_type && !table.contains(required) {
                    return Err(RegistryError::schema_not_found(node_type, required));
                }
            }
            if let Some(default_type) = &definition.default_primary_type {
                if default_type == node_type {
                    if candidate.is_mixin {
                        return Err(invalid("the default primary type cannot be a mixin"));
                    }
                } else {
                    match table.get(default_type) {
                        None => return Err(RegistryError::schema_not_found(node_type, default_type)),
                        Some(def) if def.is_mixin => {
                            return Err(invalid("the default primary type cannot be a mixin"))
                        }
                        Some(_) => {}
                    }
                }
                let satisfies = definition
                    .required_primary_types
                    .iter()
                    .all(|required| is_a(table, candidate, default_type, required));
                if !satisfies {
                    return Err(invalid("the default primary type does not satisfy the required primary types"));
                }
            }
        }
        Ok(())
    }

    // ==================== Overrides ====================

    fn check_property_overrides(
        &self,
        candidate: &NodeTypeDefinition,
        inherited: &EffectiveType,
    ) -> RegistryResult<()> {
        for definition in &candidate.property_definitions {
            for overridden in inherited.property_definitions().filter(|d| d.shares_slot(definition)) {
                check_property_override(&candidate.name, overridden, definition)?;
            }
        }
        Ok(())
    }

    fn check_child_node_overrides(
        &self,
        table: &TypeTable,
        candidate: &NodeTypeDefinition,
        inherited: &EffectiveType,
    ) -> RegistryResult<()> {
        let is_a = |sub: &Name, sup: &Name| is_a(table, candidate, sub, sup);
        for definition in &candidate.child_node_definitions {
            for overridden in inherited
                .child_node_definitions()
                .filter(|d| d.name == definition.name)
            {
                check_child_node_override(&candidate.name, overridden, definition, is_a)?;
            }
        }
        Ok(())
    }

    /// Reject inherited definitions that share an identity but disagree,
    /// unless the candidate redeclares the name.
    fn check_diamonds(
        &self,
        table: &TypeTable,
        candidate: &NodeTypeDefinition,
        inherited: &EffectiveType,
    ) -> RegistryResult<()> {
        let related = |a: &Name, b: &Name| table.is_node_type(a, b) || table.is_node_type(b, a);

        let mut properties: HashMap<_, Vec<&PropertyDefinition>> = HashMap::new();
        for definition in inherited.property_definitions() {
            properties.entry(definition.key()).or_default().push(definition);
        }
        for group in properties.values() {
            if let Some((a, b)) = conflicting_pair(group, |a, b| {
                !related(&a.declaring_type, &b.declaring_type) && !a.same_signature(b)
            }) {
                if !candidate.declares(&a.name) {
                    return Err(diamond(&candidate.name, &a.name, &a.declaring_type, &b.declaring_type));
                }
            }
        }

        let mut children: HashMap<_, Vec<&ChildNodeDefinition>> = HashMap::new();
        for definition in inherited.child_node_definitions() {
            children.entry(definition.key()).or_default().push(definition);
        }
        for group in children.values() {
            if let Some((a, b)) = conflicting_pair(group, |a, b| {
                !related(&a.declaring_type, &b.declaring_type) && !a.same_signature(b)
            }) {
                if !candidate.declares(&a.name) {
                    return Err(diamond(&candidate.name, &a.name, &a.declaring_type, &b.declaring_type));
                }
            }
        }
        Ok(())
    }

    fn check_primary_item(
        &self,
        candidate: &NodeTypeDefinition,
        inherited: &EffectiveType,
    ) -> RegistryResult<()> {
        let Some(item) = &candidate.primary_item_name else {
            return Ok(());
        };
        let declared = candidate.declared_properties_named(item).count()
            + candidate.declared_child_nodes_named(item).count();
        let matches = if declared > 0 {
            declared
        } else {
            inherited.property_definitions_named(item).count()
                + inherited.child_node_definitions_named(item).count()
        };
        match matches {
            1 => Ok(()),
            0 => Err(RegistryError::invalid_definition(
                &candidate.name,
                format!("primary item {} matches no item definition", item),
            )),
            _ => Err(RegistryError::invalid_definition(
                &candidate.name,
                format!("primary item {} is ambiguous", item),
            )),
        }
    }
}

/// Check that `definition` may override `overridden`.
pub fn check_property_override(
    node_type: &Name,
    overridden: &PropertyDefinition,
    definition: &PropertyDefinition,
) -> RegistryResult<()> {
    let illegal = |reason: String| RegistryError::illegal_override(node_type, &definition.name, reason);
    if overridden.protected {
        return Err(illegal(format!(
            "the definition declared by {} is protected",
            overridden.declaring_type
        )));
    }
    if !narrows_required_type(overridden.required_type, definition.required_type) {
        return Err(illegal(format!(
            "{} does not narrow {} declared by {}",
            definition.required_type, overridden.required_type, overridden.declaring_type
        )));
    }
    if overridden.mandatory && !definition.mandatory {
        return Err(illegal(format!(
            "the definition declared by {} is mandatory",
            overridden.declaring_type
        )));
    }
    if overridden.required_type != RequiredType::Undefined
        && !constraints_tighten(&overridden.constraints, &definition.constraints)
    {
        return Err(illegal(format!(
            "constraints are looser than those declared by {}",
            overridden.declaring_type
        )));
    }
    Ok(())
}

/// Check that `definition` may override `overridden`.
pub fn check_child_node_override(
    node_type: &Name,
    overridden: &ChildNodeDefinition,
    definition: &ChildNodeDefinition,
    is_a: impl Fn(&Name, &Name) -> bool,
) -> RegistryResult<()> {
    let illegal = |reason: String| RegistryError::illegal_override(node_type, &definition.name, reason);
    if overridden.protected {
        return Err(illegal(format!(
            "the definition declared by {} is protected",
            overridden.declaring_type
        )));
    }
    if !narrows_required_primary_types(
        &overridden.required_primary_types,
        &definition.required_primary_types,
        is_a,
    ) {
        return Err(illegal(format!(
            "required primary types do not narrow those declared by {}",
            overridden.declaring_type
        )));
    }
    if definition.same_name_siblings && !overridden.same_name_siblings {
        return Err(illegal(format!(
            "same-name siblings are not allowed by {}",
            overridden.declaring_type
        )));
    }
    if overridden.mandatory && !definition.mandatory {
        return Err(illegal(format!(
            "the definition declared by {} is mandatory",
            overridden.declaring_type
        )));
    }
    Ok(())
}

fn conflicting_pair<'a, T>(
    group: &[&'a T],
    conflicts: impl Fn(&T, &T) -> bool,
) -> Option<(&'a T, &'a T)> {
    for (i, a) in group.iter().enumerate() {
        for b in &group[i + 1..] {
            if conflicts(a, b) {
                return Some((*a, *b));
            }
        }
    }
    None
}

fn diamond(node_type: &Name, item: &Name, first: &Name, second: &Name) -> RegistryError {
    RegistryError::illegal_override(
        node_type,
        item,
        format!("conflicting definitions inherited from {} and {}", first, second),
    )
}

/// Subtyping that also knows about the candidate being registered.
fn is_a(table: &TypeTable, candidate: &NodeTypeDefinition, sub: &Name, sup: &Name) -> bool {
    if sub == &candidate.name {
        sub == sup || candidate.supertypes.iter().any(|s| table.is_node_type(s, sup))
    } else {
        table.is_node_type(sub, sup)
    }
}
