//! Mixin composition scenarios.

use arbor_tests::prelude::*;

fn prop(name: &str, t: RequiredType) -> PropertyDefinition {
    PropertyDefinition::new(n(name), t)
}

fn mixin_types() -> Vec<NodeTypeDefinition> {
    vec![
        NodeTypeDefinition::new(n("Plain")),
        NodeTypeDefinition::new(n("Described")).mixin().property(prop("description", RequiredType::String)),
        NodeTypeDefinition::new(n("NumberedDescription"))
            .mixin()
            .property(prop("description", RequiredType::Long)),
        NodeTypeDefinition::new(n("Versioned"))
            .mixin()
            .property(
                prop("revision", RequiredType::Long)
                    .auto_created()
                    .with_default(1i64)
                    .with_constraint("[1,]"),
            )
            .child_node(
                ChildNodeDefinition::new(n("history"))
                    .auto_created()
                    .requires(Name::nt("base"))
                    .with_default_type(Name::nt("unstructured")),
            ),
        NodeTypeDefinition::new(n("Tracked")).mixin().extends(n("Versioned")),
    ]
}

mod add_and_remove {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("add_and_remove")
            .step("types", |w: &mut World| w.register(mixin_types()), |a| a.registered(5))
            .step(
                "plain_node",
                |w: &mut World| {
                    w.put_node("doc", MemoryNode::new(n("Plain")).with_property(n("description"), "hello"))
                },
                |a| a.applied(),
            )
            .step("add_described", |w: &mut World| w.add_mixin("doc", &n("Described")), |a| a.applied())
            .step(
                "add_described_again",
                |w: &mut World| w.add_mixin("doc", &n("Described")),
                |a| a.refused(ErrorKind::StructuralConflict).error("already"),
            )
            .step(
                "conflicting_mixin",
                |w: &mut World| w.add_mixin("doc", &n("NumberedDescription")),
                |a| a.refused(ErrorKind::StructuralConflict),
            )
            .step(
                "remove_sole_source",
                |w: &mut World| w.remove_mixin("doc", &n("Described")),
                |a| a.refused(ErrorKind::StructuralConflict).error("description"),
            )
            .step(
                "primary_type_is_not_a_mixin",
                |w: &mut World| w.add_mixin("doc", &n("Plain")),
                |a| a.refused(ErrorKind::StructuralConflict).error("not a mixin"),
            )
            .step(
                "unknown_mixin",
                |w: &mut World| w.add_mixin("doc", &n("Missing")),
                |a| a.refused(ErrorKind::SchemaNotFound),
            )
    }

    #[test]
    fn test_mixins_guard_existing_content() {
        scenario().run().unwrap();
    }
}

mod covered_by_primary {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("covered_by_primary")
            .step("types", |w: &mut World| w.register(mixin_types()), |a| a.registered(5))
            .step(
                "unstructured_node",
                |w: &mut World| {
                    w.put_node(
                        "doc",
                        MemoryNode::new(Name::nt("unstructured")).with_property(n("description"), "hello"),
                    )
                },
                |a| a.applied(),
            )
            .step("add_described", |w: &mut World| w.add_mixin("doc", &n("Described")), |a| a.applied())
            .step("remove_described", |w: &mut World| w.remove_mixin("doc", &n("Described")), |a| a.applied())
            .step(
                "description_governed_by_primary",
                |w: &mut World| {
                    let mixins = w.node("doc").map(|d| d.mixins().to_vec()).unwrap_or_default();
                    w.resolve_property(
                        &Name::nt("unstructured"),
                        &mixins,
                        PropertyQuery::named(n("description")).with_value(&Value::from("hello")),
                    )
                },
                |a| a.residual().declared_by(Name::nt("unstructured")),
            )
            .step(
                "remove_again",
                |w: &mut World| w.remove_mixin("doc", &n("Described")),
                |a| a.refused(ErrorKind::StructuralConflict).error("not assigned"),
            )
    }

    #[test]
    fn test_removal_allowed_when_primary_type_covers_items() {
        scenario().run().unwrap();
    }
}

mod siblings {
    use super::*;

    fn sibling_types() -> Vec<NodeTypeDefinition> {
        vec![
            NodeTypeDefinition::new(n("OneItem"))
                .mixin()
                .child_node(ChildNodeDefinition::new(n("item")).requires(Name::nt("base"))),
            NodeTypeDefinition::new(n("Items"))
                .mixin()
                .child_node(ChildNodeDefinition::new(n("item")).requires(Name::nt("base")).same_name_siblings()),
        ]
    }

    pub fn scenario() -> Scenario {
        Scenario::new("siblings")
            .step("types", |w: &mut World| w.register(sibling_types()), |a| a.registered(2))
            .step(
                "two_items",
                |w: &mut World| {
                    w.put_node(
                        "list",
                        MemoryNode::new(Name::nt("folder"))
                            .with_child(n("item"), Name::nt("folder"))
                            .with_child(n("item"), Name::nt("folder")),
                    )
                },
                |a| a.applied(),
            )
            .step(
                "single_item_mixin",
                |w: &mut World| w.add_mixin("list", &n("OneItem")),
                |a| a.refused(ErrorKind::StructuralConflict).error("item"),
            )
            .step("sibling_mixin", |w: &mut World| w.add_mixin("list", &n("Items")), |a| a.applied())
            .step(
                "remove_sibling_mixin",
                |w: &mut World| w.remove_mixin("list", &n("Items")),
                |a| a.refused(ErrorKind::StructuralConflict).error("item"),
            )
    }

    #[test]
    fn test_same_name_siblings_need_a_sibling_definition() {
        scenario().run().unwrap();
    }
}

#[test]
fn test_constraint_picks_governing_definition_on_removal() {
    // GIVEN a primary pattern the value fails and a mixin definition it fits
    let mut world = World::new(RegistryConfig::jcr()).unwrap();
    let types = vec![
        NodeTypeDefinition::new(n("Coded"))
            .property(prop("code", RequiredType::String).with_constraint("[a-z]+")),
        NodeTypeDefinition::new(n("AnyCode")).mixin().property(prop("code", RequiredType::String)),
        NodeTypeDefinition::new(n("Marker")).mixin(),
    ];
    assert!(matches!(world.register(types), Outcome::Registered(_)));
    world.put_node("doc", MemoryNode::new(n("Coded")).with_property(n("code"), "123"));
    assert!(matches!(world.add_mixin("doc", &n("AnyCode")), Outcome::Applied));
    assert!(matches!(world.add_mixin("doc", &n("Marker")), Outcome::Applied));

    // WHEN the unrelated marker is removed THEN the value stays governed
    assert!(matches!(world.remove_mixin("doc", &n("Marker")), Outcome::Applied));

    // AND removing the mixin that governs it is refused
    assert!(matches!(
        world.remove_mixin("doc", &n("AnyCode")),
        Outcome::Refused { kind: ErrorKind::StructuralConflict, .. }
    ));
}

#[test]
fn test_inherited_auto_created_items_are_materialized() {
    use pretty_assertions::assert_eq;

    // GIVEN an unstructured node and a mixin inheriting auto-created items
    let mut world = World::new(RegistryConfig::jcr()).unwrap();
    assert!(matches!(world.register(mixin_types()), Outcome::Registered(_)));
    world.put_node("doc", MemoryNode::new(Name::nt("unstructured")));

    // WHEN the mixin is added
    assert!(matches!(world.add_mixin("doc", &n("Tracked")), Outcome::Applied));

    // THEN the inherited items exist with their defaults
    let node = world.node("doc").unwrap();
    assert_eq!(node.mixins(), &[n("Tracked")]);
    assert_eq!(node.property(&n("revision")), Some(PropertyState::single(Value::Long(1))));
    assert_eq!(
        node.child(&n("history")).map(|c| c.primary_type.clone()),
        Some(Name::nt("unstructured"))
    );

    // AND the supertype mixin is now part of the node's type
    assert!(matches!(
        world.add_mixin("doc", &n("Versioned")),
        Outcome::Refused { kind: ErrorKind::StructuralConflict, .. }
    ));
}

#[test]
fn test_existing_value_outside_constraint_blocks_add() {
    let mut world = World::new(RegistryConfig::jcr()).unwrap();
    world.register(mixin_types());
    world.put_node(
        "doc",
        MemoryNode::new(Name::nt("unstructured")).with_property(n("revision"), 0i64),
    );

    let outcome = world.add_mixin("doc", &n("Versioned"));
    assert!(matches!(outcome, Outcome::Refused { kind: ErrorKind::StructuralConflict, .. }));
    assert!(world.node("doc").unwrap().mixins().is_empty());
}
