//! The type store - copy-on-write table of registered node types.

use crate::{
    builtin_node_types, NodeTypeDefinition, RegistrationValidator, RegistryConfig, RegistryResult,
};
use arbor_core::Name;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// An immutable table of node types. Readers hold one of these as a
/// snapshot; registration publishes a new table instead of mutating it.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    /// Node type definitions by name.
    types: HashMap<Name, Arc<NodeTypeDefinition>>,
    /// Names in registration order.
    order: Vec<Name>,
}

impl TypeTable {
    // ==================== Type Lookups ====================

    pub fn get(&self, name: &Name) -> Option<&Arc<NodeTypeDefinition>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.types.contains_key(name)
    }

    /// All definitions, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<NodeTypeDefinition>> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Declared supertypes of `name`, in declaration order.
    pub fn supertypes(&self, name: &Name) -> Option<&[Name]> {
        self.types.get(name).map(|def| def.supertypes.as_slice())
    }

    // ==================== Subtyping ====================

    /// Check if `candidate` is `target` or (transitively) extends it.
    pub fn is_node_type(&self, candidate: &Name, target: &Name) -> bool {
        if candidate == target {
            return true;
        }
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&Name> = VecDeque::new();
        queue.push_back(candidate);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(def) = self.types.get(current) {
                for supertype in &def.supertypes {
                    if supertype == target {
                        return true;
                    }
                    queue.push_back(supertype);
                }
            }
        }
        false
    }

    /// Every registered type that extends `name`, directly or transitively,
    /// in registration order.
    pub fn subtypes(&self, name: &Name) -> Vec<Name> {
        self.order
            .iter()
            .filter(|candidate| *candidate != name && self.is_node_type(candidate, name))
            .cloned()
            .collect()
    }

    fn insert(&mut self, definition: Arc<NodeTypeDefinition>) {
        let name = definition.name.clone();
        if self.types.insert(name.clone(), definition).is_none() {
            self.order.push(name);
        }
    }
}

/// Process-wide store of node type definitions.
///
/// Reads take a snapshot of the current table; writes copy the table, apply
/// the change and swap the new table in, so resolutions running against an
/// older snapshot are never affected.
#[derive(Debug, Default)]
pub struct TypeStore {
    current: RwLock<Arc<TypeTable>>,
    /// Serializes writers (single registrations and whole batches).
    writer: Mutex<()>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the built-in node types.
    pub fn with_builtins() -> RegistryResult<Self> {
        let store = Self::new();
        RegistrationValidator::new(RegistryConfig::default())
            .register_batch(&store, builtin_node_types())?;
        Ok(store)
    }

    /// The current table. The returned snapshot never changes.
    pub fn snapshot(&self) -> Arc<TypeTable> {
        self.current.read().clone()
    }

    pub fn get(&self, name: &Name) -> Option<Arc<NodeTypeDefinition>> {
        self.current.read().get(name).cloned()
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.current.read().contains(name)
    }

    pub fn all(&self) -> Vec<Arc<NodeTypeDefinition>> {
        self.current.read().all().cloned().collect()
    }

    /// Insert or replace a definition by name. No validation is performed and
    /// dependents of a replaced type are not revalidated.
    pub fn register(&self, definition: NodeTypeDefinition) -> Arc<NodeTypeDefinition> {
        let _writer = self.writer.lock();
        self.publish(definition)
    }

    pub(crate) fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writer.lock()
    }

    /// Publish a new table containing `definition`. Callers must hold the
    /// writer lock.
    pub(crate) fn publish(&self, definition: NodeTypeDefinition) -> Arc<NodeTypeDefinition> {
        let definition = Arc::new(definition);
        let mut next = (**self.current.read()).clone();
        next.insert(Arc::clone(&definition));
        *self.current.write() = Arc::new(next);
        definition
    }
}
