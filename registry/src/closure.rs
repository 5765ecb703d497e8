//! Effective type closures.
//!
//! A closure is the ordered set of node types contributing definitions to a
//! node: its primary type, its mixins and all of their ancestors. The order
//! is the search order used by definition resolution.

use crate::{
    ChildNodeDefinition, NodeTypeDefinition, PropertyDefinition, RegistryError, RegistryResult,
    TypeTable,
};
use arbor_core::Name;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// One node type within a closure.
#[derive(Debug, Clone)]
pub struct ClosureEntry {
    pub node_type: Arc<NodeTypeDefinition>,
    /// Number of supertype edges from the nearest root.
    pub distance: usize,
    /// Position in the declaring subtype's supertype list (0 for roots).
    pub breadth_index: usize,
    /// Index of the root this entry was reached from (primary type first).
    pub root_index: usize,
}

/// The ordered closure of a primary type plus mixins.
#[derive(Debug, Clone)]
pub struct EffectiveType {
    roots: Vec<Name>,
    entries: Vec<ClosureEntry>,
    table: Arc<TypeTable>,
}

impl EffectiveType {
    /// Compute the closure of `primary` plus `mixins` against `table`.
    pub fn resolve(table: &Arc<TypeTable>, primary: &Name, mixins: &[Name]) -> RegistryResult<Self> {
        let roots: Vec<Name> = std::iter::once(primary).chain(mixins).cloned().collect();
        for root in &roots {
            if !table.contains(root) {
                return Err(RegistryError::UnknownType(root.clone()));
            }
        }
        let starts: Vec<(Name, usize)> = roots.iter().cloned().map(|r| (r, 0)).collect();
        Ok(Self::walk(table, roots, starts, 0))
    }

    /// The inherited view of a type with the given supertypes: the closure of
    /// those supertypes, with each supertype at distance 1. Unknown
    /// supertypes are skipped.
    pub fn of_supertypes(table: &Arc<TypeTable>, supertypes: &[Name]) -> Self {
        let roots: Vec<Name> = supertypes.to_vec();
        let starts: Vec<(Name, usize)> = supertypes
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, s)| (s, i))
            .collect();
        Self::walk(table, roots, starts, 1)
    }

    /// Breadth-first walk from `starts`, sorted by distance, then by position
    /// in the declaring type's supertype list, then by root. Breadth index is
    /// compared across branches: at one distance every first-declared
    /// supertype precedes every second-declared one, so with `D extends
    /// [A, C]`, `A extends [A1, A2]` and `C extends [C1]` the grandparents
    /// come out as A1, C1, A2.
    fn walk(
        table: &Arc<TypeTable>,
        roots: Vec<Name>,
        starts: Vec<(Name, usize)>,
        base_distance: usize,
    ) -> Self {
        let mut entries: Vec<ClosureEntry> = Vec::new();
        let mut index: HashMap<Name, usize> = HashMap::new();
        let mut queue: VecDeque<Name> = VecDeque::new();

        for (root_index, (name, breadth_index)) in starts.into_iter().enumerate() {
            visit(
                table,
                &mut entries,
                &mut index,
                &mut queue,
                &name,
                base_distance,
                breadth_index,
                root_index,
            );
        }

        while let Some(name) = queue.pop_front() {
            let Some(&position) = index.get(&name) else {
                continue;
            };
            let (node_type, distance, root_index) = {
                let entry = &entries[position];
                (Arc::clone(&entry.node_type), entry.distance, entry.root_index)
            };
            for (breadth_index, supertype) in node_type.supertypes.iter().enumerate() {
                visit(
                    table,
                    &mut entries,
                    &mut index,
                    &mut queue,
                    supertype,
                    distance + 1,
                    breadth_index,
                    root_index,
                );
            }
        }

        // Stable sort keeps discovery order as the final tie-break.
        entries.sort_by_key(|e| (e.distance, e.breadth_index, e.root_index));

        Self {
            roots,
            entries,
            table: Arc::clone(table),
        }
    }

    pub fn roots(&self) -> &[Name] {
        &self.roots
    }

    pub fn entries(&self) -> &[ClosureEntry] {
        &self.entries
    }

    pub fn table(&self) -> &Arc<TypeTable> {
        &self.table
    }

    pub fn node_types(&self) -> impl Iterator<Item = &Arc<NodeTypeDefinition>> {
        self.entries.iter().map(|e| &e.node_type)
    }

    pub fn names(&self) -> Vec<Name> {
        self.node_types().map(|t| t.name.clone()).collect()
    }

    /// Check if `name` is one of the types in this closure.
    pub fn contains(&self, name: &Name) -> bool {
        self.entries.iter().any(|e| &e.node_type.name == name)
    }

    /// Check if a node with this closure is of type `name`.
    pub fn is_node_type(&self, name: &Name) -> bool {
        self.contains(name)
    }

    /// All property definitions, in search order.
    pub fn property_definitions(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.node_types().flat_map(|t| t.property_definitions.iter())
    }

    /// All child node definitions, in search order.
    pub fn child_node_definitions(&self) -> impl Iterator<Item = &ChildNodeDefinition> {
        self.node_types().flat_map(|t| t.child_node_definitions.iter())
    }

    /// Check if `name` was given as one of the mixins of this closure.
    pub fn is_mixin_root(&self, name: &Name) -> bool {
        self.roots.iter().skip(1).any(|r| r == name)
    }

    /// The root type a definition's declaring type was reached from.
    pub fn root_of(&self, declaring_type: &Name) -> Option<&Name> {
        self.entries
            .iter()
            .find(|e| &e.node_type.name == declaring_type)
            .and_then(|e| self.roots.get(e.root_index))
    }
}

#[allow(clippy::too_many_arguments)]
fn visit(
    table: &TypeTable,
    entries: &mut Vec<ClosureEntry>,
    index: &mut HashMap<Name, usize>,
    queue: &mut VecDeque<Name>,
    name: &Name,
    distance: usize,
    breadth_index: usize,
    root_index: usize,
) {
    if let Some(&position) = index.get(name) {
        let existing = &mut entries[position];
        // Revisited at the same distance before being expanded: keep the
        // smallest ordering key.
        if existing.distance == distance
            && (breadth_index, root_index) < (existing.breadth_index, existing.root_index)
        {
            existing.breadth_index = breadth_index;
            existing.root_index = root_index;
        }
        return;
    }
    let Some(node_type) = table.get(name) else {
        tracing::warn!(node_type = %name, "skipping unknown supertype in closure");
        return;
    };
    index.insert(name.clone(), entries.len());
    entries.push(ClosureEntry {
        node_type: Arc::clone(node_type),
        distance,
        breadth_index,
        root_index,
    });
    queue.push_back(name.clone());
}
