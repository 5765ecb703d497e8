//! Node state seen by the mixin engine.

use arbor_core::{Name, Value};
use arbor_registry::ChildNodeDefinition;

/// The values of one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyState {
    pub values: Vec<Value>,
    pub multiple: bool,
}

impl PropertyState {
    pub fn single(value: impl Into<Value>) -> Self {
        Self {
            values: vec![value.into()],
            multiple: false,
        }
    }

    pub fn multiple(values: Vec<Value>) -> Self {
        Self {
            values,
            multiple: true,
        }
    }
}

/// A child node, by name and primary type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildNode {
    pub name: Name,
    pub primary_type: Name,
}

/// Access to the node a mixin is added to or removed from.
///
/// Implementations belong to the content layer; the engine only reads the
/// node's types and items and applies the resulting changes.
pub trait NodeState {
    fn primary_type(&self) -> &Name;

    fn mixins(&self) -> &[Name];

    fn property_names(&self) -> Vec<Name>;

    fn property(&self, name: &Name) -> Option<PropertyState>;

    fn child_nodes(&self) -> Vec<ChildNode>;

    /// The definition governing this node within its parent, if any.
    fn governing_definition(&self) -> Option<ChildNodeDefinition>;

    fn set_property(&mut self, name: Name, state: PropertyState);

    fn add_child_node(&mut self, name: Name, primary_type: Name);

    fn set_mixins(&mut self, mixins: Vec<Name>);
}

/// In-memory [`NodeState`].
#[derive(Debug, Clone)]
pub struct MemoryNode {
    primary_type: Name,
    mixins: Vec<Name>,
    properties: Vec<(Name, PropertyState)>,
    children: Vec<ChildNode>,
    definition: Option<ChildNodeDefinition>,
}

impl MemoryNode {
    pub fn new(primary_type: Name) -> Self {
        Self {
            primary_type,
            mixins: Vec::new(),
            properties: Vec::new(),
            children: Vec::new(),
            definition: None,
        }
    }

    pub fn with_mixin(mut self, mixin: Name) -> Self {
        self.mixins.push(mixin);
        self
    }

    pub fn with_property(mut self, name: Name, value: impl Into<Value>) -> Self {
        self.set_property(name, PropertyState::single(value));
        self
    }

    pub fn with_values(mut self, name: Name, values: Vec<Value>) -> Self {
        self.set_property(name, PropertyState::multiple(values));
        self
    }

    pub fn with_child(mut self, name: Name, primary_type: Name) -> Self {
        self.add_child_node(name, primary_type);
        self
    }

    pub fn governed_by(mut self, definition: ChildNodeDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    pub fn child(&self, name: &Name) -> Option<&ChildNode> {
        self.children.iter().find(|c| &c.name == name)
    }
}

impl NodeState for MemoryNode {
    fn primary_type(&self) -> &Name {
        &self.primary_type
    }

    fn mixins(&self) -> &[Name] {
        &self.mixins
    }

    fn property_names(&self) -> Vec<Name> {
        self.properties.iter().map(|(name, _)| name.clone()).collect()
    }

    fn property(&self, name: &Name) -> Option<PropertyState> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, state)| state.clone())
    }

    fn child_nodes(&self) -> Vec<ChildNode> {
        self.children.clone()
    }

    fn governing_definition(&self) -> Option<ChildNodeDefinition> {
        self.definition.clone()
    }

    fn set_property(&mut self, name: Name, state: PropertyState) {
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = state,
            None => self.properties.push((name, state)),
        }
    }

    fn add_child_node(&mut self, name: Name, primary_type: Name) {
        self.children.push(ChildNode { name, primary_type });
    }

    fn set_mixins(&mut self, mixins: Vec<Name>) {
        self.mixins = mixins;
    }
}
