//! Definition resolution scenarios.

use arbor_tests::prelude::*;

fn prop(name: &str, t: RequiredType) -> PropertyDefinition {
    PropertyDefinition::new(n(name), t)
}

fn diamond_types() -> Vec<NodeTypeDefinition> {
    vec![
        NodeTypeDefinition::new(n("B")).property(prop("singleProp1", RequiredType::Long)),
        NodeTypeDefinition::new(n("A"))
            .property(prop("singleProp1", RequiredType::String))
            .property(prop("fromA", RequiredType::Boolean)),
        NodeTypeDefinition::new(n("C")).extends(n("B")),
        NodeTypeDefinition::new(n("D")).extends(n("A")).extends(n("C")),
    ]
}

mod inheritance {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("inheritance")
            .step("types", |w: &mut World| w.register(diamond_types()), |a| a.registered(4))
            .step(
                "inherited_from_ancestor",
                |w: &mut World| w.resolve_property(&n("D"), &[], PropertyQuery::named(n("fromA"))),
                |a| a.declared_by(n("A")).of_type(RequiredType::Boolean),
            )
            .step(
                "leftmost_supertype_wins",
                |w: &mut World| w.resolve_property(&n("D"), &[], PropertyQuery::named(n("singleProp1"))),
                |a| a.declared_by(n("A")).of_type(RequiredType::String),
            )
            .step(
                "long_value_selects_long_definition",
                |w: &mut World| {
                    w.resolve_property(
                        &n("D"),
                        &[],
                        PropertyQuery::named(n("singleProp1")).with_value(&Value::Long(1)),
                    )
                },
                |a| a.declared_by(n("B")).of_type(RequiredType::Long),
            )
            .step(
                "builtin_ancestor",
                |w: &mut World| w.resolve_property(&n("D"), &[], PropertyQuery::named(Name::jcr("primaryType"))),
                |a| a.declared_by(Name::nt("base")),
            )
    }

    #[test]
    fn test_nearest_and_leftmost_definition_wins() {
        scenario().run().unwrap();
    }
}

mod value_types {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("value_types")
            .step(
                "types",
                |w: &mut World| {
                    w.register(vec![
                        NodeTypeDefinition::new(n("Numbers"))
                            .property(prop("value", RequiredType::Double))
                            .property(prop("value", RequiredType::Long)),
                        NodeTypeDefinition::new(n("Loose"))
                            .extends(n("Numbers"))
                            .property(PropertyDefinition::residual(RequiredType::String)),
                    ])
                },
                |a| a.registered(2),
            )
            .step(
                "double_value",
                |w: &mut World| {
                    w.resolve_property(&n("Numbers"), &[], PropertyQuery::named(n("value")).with_value(&Value::Double(2.5)))
                },
                |a| a.of_type(RequiredType::Double),
            )
            .step(
                "string_value_matches_nothing",
                |w: &mut World| {
                    w.resolve_property(&n("Numbers"), &[], PropertyQuery::named(n("value")).with_value(&Value::from("x")))
                },
                |a| a.no_definition(),
            )
            .step(
                "residual_not_consulted_for_declared_name",
                |w: &mut World| {
                    w.resolve_property(&n("Loose"), &[], PropertyQuery::named(n("value")).with_value(&Value::from("x")))
                },
                |a| a.no_definition(),
            )
            .step(
                "residual_for_other_names",
                |w: &mut World| {
                    w.resolve_property(&n("Loose"), &[], PropertyQuery::named(n("other")).with_value(&Value::from("x")))
                },
                |a| a.residual().of_type(RequiredType::String).declared_by(n("Loose")),
            )
    }

    #[test]
    fn test_value_type_narrows_candidates() {
        scenario().run().unwrap();
    }
}

mod mixin_roots {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("mixin_roots")
            .step(
                "types",
                |w: &mut World| {
                    w.register(vec![
                        NodeTypeDefinition::new(n("Page")).property(prop("title", RequiredType::String)),
                        NodeTypeDefinition::new(n("Titled")).mixin().property(prop("title", RequiredType::String)),
                        NodeTypeDefinition::new(n("Rated")).mixin().property(prop("rating", RequiredType::Long)),
                    ])
                },
                |a| a.registered(3),
            )
            .step(
                "primary_before_mixin",
                |w: &mut World| w.resolve_property(&n("Page"), &[n("Titled")], PropertyQuery::named(n("title"))),
                |a| a.declared_by(n("Page")),
            )
            .step(
                "mixin_only_definition",
                |w: &mut World| {
                    w.resolve_property(&n("Page"), &[n("Titled"), n("Rated")], PropertyQuery::named(n("rating")))
                },
                |a| a.declared_by(n("Rated")),
            )
            .step(
                "unknown_mixin",
                |w: &mut World| w.resolve_property(&n("Page"), &[n("Missing")], PropertyQuery::named(n("title"))),
                |a| a.rejected(ErrorKind::SchemaNotFound),
            )
    }

    #[test]
    fn test_primary_type_precedes_mixins() {
        scenario().run().unwrap();
    }
}

mod child_nodes {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("child_nodes")
            .step(
                "unstructured_default",
                |w: &mut World| {
                    w.resolve_child_node(&Name::nt("unstructured"), &[], ChildNodeQuery::named(n("anything")))
                },
                |a| a.residual().declared_by(Name::nt("unstructured")),
            )
            .step(
                "mixin_type_as_child_rejected",
                |w: &mut World| {
                    w.resolve_child_node(
                        &Name::nt("unstructured"),
                        &[],
                        ChildNodeQuery::named(n("anything")).with_primary_type(Name::mix("referenceable")),
                    )
                },
                |a| a.no_definition(),
            )
            .step(
                "siblings_allowed",
                |w: &mut World| {
                    w.resolve_child_node(
                        &Name::nt("unstructured"),
                        &[],
                        ChildNodeQuery::named(n("item")).same_name_siblings(),
                    )
                },
                |a| a.residual(),
            )
            .step(
                "siblings_not_allowed_in_file",
                |w: &mut World| {
                    w.resolve_child_node(
                        &Name::nt("file"),
                        &[],
                        ChildNodeQuery::named(Name::jcr("content")).same_name_siblings(),
                    )
                },
                |a| a.no_definition(),
            )
    }

    #[test]
    fn test_child_node_resolution() {
        scenario().run().unwrap();
    }
}
