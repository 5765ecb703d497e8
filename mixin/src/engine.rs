//! Mixin composition.
//!
//! Adding a mixin merges its closure into the node's effective type. The
//! merge is refused when a definition the mixin brings in clashes with one
//! already governing the node, or when existing content would not be
//! acceptable to the mixin. Removing a mixin is refused when some existing
//! item would be left without a governing definition.

use crate::{ChildNode, MixinConfig, MixinError, MixinResult, NodeState, PropertyState};
use arbor_constraint::{ConstraintEvaluator, ReferenceResolver};
use arbor_core::{Name, NamespaceContext};
use arbor_registry::{
    narrows_required_primary_types, narrows_required_type, ChildNodeDefinition, ChildNodeQuery,
    EffectiveType, PropertyDefinition, PropertyQuery, RegistryError, TypeStore, TypeTable,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Changes queued by [`MixinEngine::add_mixin`] once all checks pass.
enum Materialize {
    Property(Name, PropertyState),
    Child(Name, Name),
}

/// Adds and removes mixin types on nodes.
pub struct MixinEngine {
    store: Arc<TypeStore>,
    namespaces: Arc<dyn NamespaceContext + Send + Sync>,
    references: Option<Arc<dyn ReferenceResolver + Send + Sync>>,
    config: MixinConfig,
}

impl MixinEngine {
    pub fn new(store: Arc<TypeStore>, namespaces: Arc<dyn NamespaceContext + Send + Sync>) -> Self {
        Self {
            store,
            namespaces,
            references: None,
            config: MixinConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MixinConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolver used when existing REFERENCE properties are re-checked.
    pub fn with_references(mut self, resolver: Arc<dyn ReferenceResolver + Send + Sync>) -> Self {
        self.references = Some(resolver);
        self
    }

    fn evaluator(&self, table: &Arc<TypeTable>) -> ConstraintEvaluator {
        let evaluator = ConstraintEvaluator::new(Arc::clone(table));
        match &self.references {
            Some(resolver) => evaluator.with_references(Arc::clone(resolver)),
            None => evaluator,
        }
    }

    // ==================== Adding ====================

    pub fn can_add_mixin(&self, node: &dyn NodeState, mixin: &Name) -> bool {
        self.check_add_mixin(node, mixin).is_ok()
    }

    /// Check whether `mixin` can be added to `node`, returning the reason when
    /// it cannot.
    pub fn check_add_mixin(&self, node: &dyn NodeState, mixin: &Name) -> MixinResult<()> {
        let table = self.store.snapshot();
        self.check_add(&table, node, mixin).map(|_| ())
    }

    /// Add `mixin` to `node` and materialize its auto-created items.
    pub fn add_mixin(&self, node: &mut dyn NodeState, mixin: &Name) -> MixinResult<()> {
        let table = self.store.snapshot();
        let candidate = match self.check_add(&table, node, mixin) {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(mixin = %mixin, error = %e, "refused to add mixin");
                return Err(e);
            }
        };

        let pending = if self.config.materialize_auto_created {
            self.plan_auto_created(node, mixin, &candidate)?
        } else {
            Vec::new()
        };

        let mut mixins = node.mixins().to_vec();
        mixins.push(mixin.clone());
        node.set_mixins(mixins);
        let materialized = pending.len();
        for change in pending {
            match change {
                Materialize::Property(name, state) => node.set_property(name, state),
                Materialize::Child(name, primary_type) => node.add_child_node(name, primary_type),
            }
        }

        tracing::info!(mixin = %mixin, primary_type = %node.primary_type(), materialized, "added mixin");
        Ok(())
    }

    fn check_add(
        &self,
        table: &Arc<TypeTable>,
        node: &dyn NodeState,
        mixin: &Name,
    ) -> MixinResult<EffectiveType> {
        let definition = table
            .get(mixin)
            .ok_or_else(|| RegistryError::UnknownType(mixin.clone()))?;
        if !definition.is_mixin {
            return Err(MixinError::NotMixin(mixin.clone()));
        }

        let current = EffectiveType::resolve(table, node.primary_type(), node.mixins())?;
        if current.contains(mixin) {
            return Err(MixinError::MixinAlreadyPresent(mixin.clone()));
        }
        if node.governing_definition().map_or(false, |d| d.protected) {
            return Err(MixinError::ProtectedNode(mixin.clone()));
        }

        let candidate = EffectiveType::resolve(table, mixin, &[])?;
        let from_primary = |declaring_type: &Name| current.root_of(declaring_type) == Some(node.primary_type());

        for added in candidate.property_definitions() {
            for existing in current
                .property_definitions()
                .filter(|e| e.shares_slot(added) && e.declaring_type != added.declaring_type)
            {
                check_property_merge(mixin, existing, added, from_primary(&existing.declaring_type))?;
            }
        }

        for added in candidate.child_node_definitions() {
            for existing in current
                .child_node_definitions()
                .filter(|e| e.name == added.name && e.declaring_type != added.declaring_type)
            {
                let is_a = |sub: &Name, sup: &Name| table.is_node_type(sub, sup);
                check_child_node_merge(mixin, existing, added, from_primary(&existing.declaring_type), is_a)?;
            }
        }

        self.check_existing_items(table, node, mixin, &candidate)?;
        Ok(candidate)
    }

    /// Existing items named by the mixin must be acceptable to it.
    fn check_existing_items(
        &self,
        table: &Arc<TypeTable>,
        node: &dyn NodeState,
        mixin: &Name,
        candidate: &EffectiveType,
    ) -> MixinResult<()> {
        let evaluator = self.evaluator(table);
        let context = self.namespaces.as_ref();

        for name in node.property_names() {
            if candidate.property_definitions_named(&name).next().is_none() {
                continue;
            }
            let Some(state) = node.property(&name) else {
                continue;
            };
            let query = property_query(&name, &state).exact_only();
            let accepted = candidate
                .find_property_definition_where(&query, |d| evaluator.satisfies_all(d, &state.values, context))
                .is_some();
            if !accepted {
                return Err(MixinError::conflict(
                    mixin,
                    format!("existing property {} is not allowed by the mixin", name),
                ));
            }
        }

        let children = node.child_nodes();
        for child in &children {
            if candidate.child_node_definitions_named(&child.name).next().is_none() {
                continue;
            }
            let query = child_query(child, &children).exact_only();
            if candidate.find_child_node_definition(&query).is_none() {
                return Err(MixinError::conflict(
                    mixin,
                    format!("existing child node {} is not allowed by the mixin", child.name),
                ));
            }
        }
        Ok(())
    }

    fn plan_auto_created(
        &self,
        node: &dyn NodeState,
        mixin: &Name,
        candidate: &EffectiveType,
    ) -> MixinResult<Vec<Materialize>> {
        let mut pending = Vec::new();

        let mut seen = HashSet::new();
        for definition in candidate.property_definitions() {
            if !definition.auto_created || definition.is_residual() || !seen.insert(&definition.name) {
                continue;
            }
            match node.property(&definition.name) {
                Some(existing) => {
                    let compatible = existing.multiple == definition.multiple
                        && existing
                            .values
                            .iter()
                            .all(|v| definition.required_type.accepts(v.required_type()));
                    if !compatible {
                        return Err(MixinError::conflict(
                            mixin,
                            format!("existing property {} has an incompatible type", definition.name),
                        ));
                    }
                }
                // Protected items without defaults are computed by the repository.
                None if definition.default_values.is_empty() => {}
                None => pending.push(Materialize::Property(
                    definition.name.clone(),
                    PropertyState {
                        values: definition.default_values.clone(),
                        multiple: definition.multiple,
                    },
                )),
            }
        }

        let children = node.child_nodes();
        let mut seen = HashSet::new();
        for definition in candidate.child_node_definitions() {
            if !definition.auto_created || definition.is_residual() || !seen.insert(&definition.name) {
                continue;
            }
            match children.iter().find(|c| c.name == definition.name) {
                Some(existing) => {
                    if !candidate.allows_child_type(definition, &existing.primary_type) {
                        return Err(MixinError::conflict(
                            mixin,
                            format!("existing child node {} has an incompatible type", definition.name),
                        ));
                    }
                }
                None => {
                    if let Some(primary_type) = &definition.default_primary_type {
                        pending.push(Materialize::Child(definition.name.clone(), primary_type.clone()));
                    }
                }
            }
        }
        Ok(pending)
    }

    // ==================== Removing ====================

    pub fn can_remove_mixin(&self, node: &dyn NodeState, mixin: &Name) -> bool {
        self.check_remove_mixin(node, mixin).is_ok()
    }

    /// Check whether `mixin` can be removed from `node`, returning the reason
    /// when it cannot.
    pub fn check_remove_mixin(&self, node: &dyn NodeState, mixin: &Name) -> MixinResult<()> {
        self.check_remove(node, mixin).map(|_| ())
    }

    /// Remove `mixin` from `node`. Existing items are left in place.
    pub fn remove_mixin(&self, node: &mut dyn NodeState, mixin: &Name) -> MixinResult<()> {
        let remaining = match self.check_remove(node, mixin) {
            Ok(remaining) => remaining,
            Err(e) => {
                tracing::warn!(mixin = %mixin, error = %e, "refused to remove mixin");
                return Err(e);
            }
        };
        node.set_mixins(remaining);
        tracing::info!(mixin = %mixin, primary_type = %node.primary_type(), "removed mixin");
        Ok(())
    }

    fn check_remove(&self, node: &dyn NodeState, mixin: &Name) -> MixinResult<Vec<Name>> {
        if !node.mixins().contains(mixin) {
            return Err(MixinError::MixinNotPresent(mixin.clone()));
        }
        if node.governing_definition().map_or(false, |d| d.protected) {
            return Err(MixinError::ProtectedNode(mixin.clone()));
        }

        let remaining: Vec<Name> = node.mixins().iter().filter(|m| *m != mixin).cloned().collect();
        let table = self.store.snapshot();
        let closure = EffectiveType::resolve(&table, node.primary_type(), &remaining)?;
        let evaluator = self.evaluator(&table);
        let context = self.namespaces.as_ref();

        for name in node.property_names() {
            let Some(state) = node.property(&name) else {
                continue;
            };
            let governed = closure
                .find_property_definition_where(&property_query(&name, &state), |d| {
                    evaluator.satisfies_all(d, &state.values, context)
                })
                .is_some();
            if !governed {
                return Err(MixinError::conflict(
                    mixin,
                    format!("property {} would no longer be allowed", name),
                ));
            }
        }

        let children = node.child_nodes();
        for child in &children {
            if closure.find_child_node_definition(&child_query(child, &children)).is_none() {
                return Err(MixinError::conflict(
                    mixin,
                    format!("child node {} would no longer be allowed", child.name),
                ));
            }
        }
        Ok(remaining)
    }
}

impl std::fmt::Debug for MixinEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixinEngine").field("config", &self.config).finish()
    }
}

fn property_query(name: &Name, state: &PropertyState) -> PropertyQuery {
    let query = PropertyQuery::named(name.clone()).multiple(state.multiple);
    match state.values.first() {
        Some(value) => query.with_value(value),
        None => query,
    }
}

/// A child sharing its name with a sibling needs a definition allowing
/// same-name siblings.
fn child_query(child: &ChildNode, children: &[ChildNode]) -> ChildNodeQuery {
    let query = ChildNodeQuery::named(child.name.clone()).with_primary_type(child.primary_type.clone());
    if children.iter().filter(|c| c.name == child.name).count() > 1 {
        query.same_name_siblings()
    } else {
        query
    }
}

/// A definition from a mixin meeting one already on the node in the same
/// slot. Identical definitions never clash.
fn check_property_merge(
    mixin: &Name,
    existing: &PropertyDefinition,
    added: &PropertyDefinition,
    from_primary: bool,
) -> MixinResult<()> {
    if existing.protected {
        return Err(MixinError::conflict(
            mixin,
            format!("property {} is protected by {}", existing.name, existing.declaring_type),
        ));
    }
    if existing.same_signature(added) {
        return Ok(());
    }
    let narrows = narrows_required_type(existing.required_type, added.required_type);
    let compatible = if from_primary {
        narrows
    } else {
        narrows && narrows_required_type(added.required_type, existing.required_type)
    };
    if !compatible {
        return Err(MixinError::conflict(
            mixin,
            format!(
                "property {} of type {} clashes with {} declared by {}",
                added.name, added.required_type, existing.required_type, existing.declaring_type
            ),
        ));
    }
    Ok(())
}

fn check_child_node_merge(
    mixin: &Name,
    existing: &ChildNodeDefinition,
    added: &ChildNodeDefinition,
    from_primary: bool,
    is_a: impl Fn(&Name, &Name) -> bool,
) -> MixinResult<()> {
    if existing.protected {
        return Err(MixinError::conflict(
            mixin,
            format!("child node {} is protected by {}", existing.name, existing.declaring_type),
        ));
    }
    if existing.same_signature(added) {
        return Ok(());
    }
    let narrows = narrows_required_primary_types(
        &existing.required_primary_types,
        &added.required_primary_types,
        &is_a,
    );
    let compatible = if from_primary {
        narrows
    } else {
        narrows
            && narrows_required_primary_types(
                &added.required_primary_types,
                &existing.required_primary_types,
                &is_a,
            )
    };
    if !compatible {
        return Err(MixinError::conflict(
            mixin,
            format!(
                "child node {} clashes with the definition declared by {}",
                added.name, existing.declaring_type
            ),
        ));
    }
    Ok(())
}
