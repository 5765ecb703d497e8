//! Built-in node types.

use crate::{ChildNodeDefinition, NodeTypeDefinition, OnParentVersion, PropertyDefinition};
use arbor_core::{Name, RequiredType};

/// The standard node types, ordered so each type follows its supertypes.
pub fn builtin_node_types() -> Vec<NodeTypeDefinition> {
    vec![
        base(),
        referenceable(),
        lockable(),
        hierarchy_node(),
        folder(),
        file(),
        resource(),
        unstructured(),
    ]
}

fn base() -> NodeTypeDefinition {
    NodeTypeDefinition::new(Name::nt("base"))
        .property(
            PropertyDefinition::new(Name::jcr("primaryType"), RequiredType::Name)
                .mandatory()
                .auto_created()
                .protected()
                .on_parent_version(OnParentVersion::Compute),
        )
        .property(
            PropertyDefinition::new(Name::jcr("mixinTypes"), RequiredType::Name)
                .multiple()
                .protected()
                .on_parent_version(OnParentVersion::Compute),
        )
}

fn referenceable() -> NodeTypeDefinition {
    NodeTypeDefinition::new(Name::mix("referenceable"))
        .mixin()
        .property(
            PropertyDefinition::new(Name::jcr("uuid"), RequiredType::String)
                .mandatory()
                .auto_created()
                .protected()
                .on_parent_version(OnParentVersion::Initialize),
        )
}

fn lockable() -> NodeTypeDefinition {
    NodeTypeDefinition::new(Name::mix("lockable"))
        .mixin()
        .property(
            PropertyDefinition::new(Name::jcr("lockOwner"), RequiredType::String)
                .protected()
                .on_parent_version(OnParentVersion::Ignore),
        )
        .property(
            PropertyDefinition::new(Name::jcr("lockIsDeep"), RequiredType::Boolean)
                .protected()
                .on_parent_version(OnParentVersion::Ignore),
        )
}

fn hierarchy_node() -> NodeTypeDefinition {
    NodeTypeDefinition::new(Name::nt("hierarchyNode"))
        .extends(Name::nt("base"))
        .property(
            PropertyDefinition::new(Name::jcr("created"), RequiredType::Date)
                .auto_created()
                .protected()
                .on_parent_version(OnParentVersion::Initialize),
        )
}

fn folder() -> NodeTypeDefinition {
    NodeTypeDefinition::new(Name::nt("folder"))
        .extends(Name::nt("hierarchyNode"))
        .child_node(
            ChildNodeDefinition::residual()
                .requires(Name::nt("hierarchyNode"))
                .on_parent_version(OnParentVersion::Version),
        )
}

fn file() -> NodeTypeDefinition {
    NodeTypeDefinition::new(Name::nt("file"))
        .extends(Name::nt("hierarchyNode"))
        .primary_item(Name::jcr("content"))
        .child_node(
            ChildNodeDefinition::new(Name::jcr("content"))
                .requires(Name::nt("base"))
                .mandatory(),
        )
}

fn resource() -> NodeTypeDefinition {
    NodeTypeDefinition::new(Name::nt("resource"))
        .extends(Name::nt("base"))
        .extends(Name::mix("referenceable"))
        .primary_item(Name::jcr("data"))
        .property(PropertyDefinition::new(Name::jcr("data"), RequiredType::Binary).mandatory())
        .property(PropertyDefinition::new(Name::jcr("encoding"), RequiredType::String))
        .property(PropertyDefinition::new(Name::jcr("lastModified"), RequiredType::Date).mandatory())
        .property(
            PropertyDefinition::new(Name::jcr("mimeType"), RequiredType::String)
                .mandatory()
                .on_parent_version(OnParentVersion::Copy),
        )
}

fn unstructured() -> NodeTypeDefinition {
    NodeTypeDefinition::new(Name::nt("unstructured"))
        .extends(Name::nt("base"))
        .orderable()
        .child_node(
            ChildNodeDefinition::residual()
                .requires(Name::nt("base"))
                .with_default_type(Name::nt("unstructured"))
                .same_name_siblings()
                .on_parent_version(OnParentVersion::Version),
        )
        .property(PropertyDefinition::residual(RequiredType::Undefined))
        .property(PropertyDefinition::residual(RequiredType::Undefined).multiple())
}
