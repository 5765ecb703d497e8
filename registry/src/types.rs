//! Schema definition types.

use arbor_core::{Name, RequiredType, Value};
use std::fmt;
use std::str::FromStr;

use crate::RegistryError;

/// What happens to an item when its parent node is versioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OnParentVersion {
    #[default]
    Copy,
    Version,
    Initialize,
    Compute,
    Ignore,
    Abort,
}

impl OnParentVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnParentVersion::Copy => "COPY",
            OnParentVersion::Version => "VERSION",
            OnParentVersion::Initialize => "INITIALIZE",
            OnParentVersion::Compute => "COMPUTE",
            OnParentVersion::Ignore => "IGNORE",
            OnParentVersion::Abort => "ABORT",
        }
    }
}

impl fmt::Display for OnParentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnParentVersion {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            OnParentVersion::Copy,
            OnParentVersion::Version,
            OnParentVersion::Initialize,
            OnParentVersion::Compute,
            OnParentVersion::Ignore,
            OnParentVersion::Abort,
        ]
        .into_iter()
        .find(|opv| opv.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| RegistryError::UnknownOnParentVersion(s.to_string()))
    }
}

/// Property definition within a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// The node type that declares this definition.
    pub declaring_type: Name,
    /// Property name, or the residual name `*`.
    pub name: Name,
    pub required_type: RequiredType,
    pub multiple: bool,
    pub auto_created: bool,
    pub mandatory: bool,
    pub protected: bool,
    pub on_parent_version: OnParentVersion,
    /// Values materialized when the property is auto-created.
    pub default_values: Vec<Value>,
    /// Raw constraint strings, interpreted per required type at check time.
    pub constraints: Vec<String>,
}

impl PropertyDefinition {
    pub fn new(name: Name, required_type: RequiredType) -> Self {
        Self {
            declaring_type: Name::residual(),
            name,
            required_type,
            multiple: false,
            auto_created: false,
            mandatory: false,
            protected: false,
            on_parent_version: OnParentVersion::default(),
            default_values: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// A residual property definition of the given type.
    pub fn residual(required_type: RequiredType) -> Self {
        Self::new(Name::residual(), required_type)
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn auto_created(mut self) -> Self {
        self.auto_created = true;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn on_parent_version(mut self, opv: OnParentVersion) -> Self {
        self.on_parent_version = opv;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_values.push(value.into());
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn with_constraints<I, S>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.extend(constraints.into_iter().map(Into::into));
        self
    }

    pub fn is_residual(&self) -> bool {
        self.name.is_residual()
    }

    /// Identity used to detect ambiguous inherited definitions.
    pub fn key(&self) -> PropertyKey {
        PropertyKey {
            name: self.name.clone(),
            required_type: self.required_type,
            multiple: self.multiple,
        }
    }

    /// True when both definitions occupy the same (name, cardinality) slot
    /// and so one overrides the other.
    pub fn shares_slot(&self, other: &PropertyDefinition) -> bool {
        self.name == other.name && self.multiple == other.multiple
    }

    /// Equal in everything except the declaring type.
    pub fn same_signature(&self, other: &PropertyDefinition) -> bool {
        self.name == other.name
            && self.required_type == other.required_type
            && self.multiple == other.multiple
            && self.auto_created == other.auto_created
            && self.mandatory == other.mandatory
            && self.protected == other.protected
            && self.on_parent_version == other.on_parent_version
            && self.default_values == other.default_values
            && self.constraints == other.constraints
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub name: Name,
    pub required_type: RequiredType,
    pub multiple: bool,
}

/// Child node definition within a node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildNodeDefinition {
    /// The node type that declares this definition.
    pub declaring_type: Name,
    /// Child name, or the residual name `*`.
    pub name: Name,
    /// Types every child must be (transitively) an instance of.
    pub required_primary_types: Vec<Name>,
    pub default_primary_type: Option<Name>,
    pub same_name_siblings: bool,
    pub auto_created: bool,
    pub mandatory: bool,
    pub protected: bool,
    pub on_parent_version: OnParentVersion,
}

impl ChildNodeDefinition {
    pub fn new(name: Name) -> Self {
        Self {
            declaring_type: Name::residual(),
            name,
            required_primary_types: Vec::new(),
            default_primary_type: None,
            same_name_siblings: false,
            auto_created: false,
            mandatory: false,
            protected: false,
            on_parent_version: OnParentVersion::default(),
        }
    }

    pub fn residual() -> Self {
        Self::new(Name::residual())
    }

    pub fn requires(mut self, type_name: Name) -> Self {
        if !self.required_primary_types.contains(&type_name) {
            self.required_primary_types.push(type_name);
        }
        self
    }

    pub fn with_default_type(mut self, type_name: Name) -> Self {
        self.default_primary_type = Some(type_name);
        self
    }

    pub fn same_name_siblings(mut self) -> Self {
        self.same_name_siblings = true;
        self
    }

    pub fn auto_created(mut self) -> Self {
        self.auto_created = true;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn on_parent_version(mut self, opv: OnParentVersion) -> Self {
        self.on_parent_version = opv;
        self
    }

    pub fn is_residual(&self) -> bool {
        self.name.is_residual()
    }

    /// Identity used to detect ambiguous inherited definitions.
    pub fn key(&self) -> ChildNodeKey {
        let mut required = self.required_primary_types.clone();
        required.sort();
        ChildNodeKey {
            name: self.name.clone(),
            required_primary_types: required,
            same_name_siblings: self.same_name_siblings,
        }
    }

    pub fn same_signature(&self, other: &ChildNodeDefinition) -> bool {
        self.key() == other.key()
            && self.default_primary_type == other.default_primary_type
            && self.auto_created == other.auto_created
            && self.mandatory == other.mandatory
            && self.protected == other.protected
            && self.on_parent_version == other.on_parent_version
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildNodeKey {
    pub name: Name,
    pub required_primary_types: Vec<Name>,
    pub same_name_siblings: bool,
}

/// Node type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTypeDefinition {
    /// Qualified type name (unique key).
    pub name: Name,
    /// Declared supertypes, in declaration order.
    pub supertypes: Vec<Name>,
    pub is_mixin: bool,
    pub has_orderable_child_nodes: bool,
    pub primary_item_name: Option<Name>,
    /// Declared property definitions (not including inherited ones).
    pub property_definitions: Vec<PropertyDefinition>,
    /// Declared child node definitions (not including inherited ones).
    pub child_node_definitions: Vec<ChildNodeDefinition>,
}

impl NodeTypeDefinition {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            supertypes: Vec::new(),
            is_mixin: false,
            has_orderable_child_nodes: false,
            primary_item_name: None,
            property_definitions: Vec::new(),
            child_node_definitions: Vec::new(),
        }
    }

    pub fn extends(mut self, supertype: Name) -> Self {
        self.supertypes.push(supertype);
        self
    }

    pub fn mixin(mut self) -> Self {
        self.is_mixin = true;
        self
    }

    pub fn orderable(mut self) -> Self {
        self.has_orderable_child_nodes = true;
        self
    }

    pub fn primary_item(mut self, name: Name) -> Self {
        self.primary_item_name = Some(name);
        self
    }

    /// Declare a property; the definition's declaring type is set to this type.
    pub fn property(mut self, mut definition: PropertyDefinition) -> Self {
        definition.declaring_type = self.name.clone();
        self.property_definitions.push(definition);
        self
    }

    /// Declare a child node; the definition's declaring type is set to this type.
    pub fn child_node(mut self, mut definition: ChildNodeDefinition) -> Self {
        definition.declaring_type = self.name.clone();
        self.child_node_definitions.push(definition);
        self
    }

    pub fn declared_properties_named<'a>(
        &'a self,
        name: &'a Name,
    ) -> impl Iterator<Item = &'a PropertyDefinition> + 'a {
        self.property_definitions.iter().filter(move |d| &d.name == name)
    }

    pub fn declared_child_nodes_named<'a>(
        &'a self,
        name: &'a Name,
    ) -> impl Iterator<Item = &'a ChildNodeDefinition> + 'a {
        self.child_node_definitions.iter().filter(move |d| &d.name == name)
    }

    /// True when this type declares any item named `name`.
    pub fn declares(&self, name: &Name) -> bool {
        self.property_definitions.iter().any(|d| &d.name == name)
            || self.child_node_definitions.iter().any(|d| &d.name == name)
    }
}
