//! Registration scenarios.

use arbor_tests::prelude::*;

fn prop(name: &str, t: RequiredType) -> PropertyDefinition {
    PropertyDefinition::new(n(name), t)
}

mod batch_ordering {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("batch_ordering")
            .step(
                "subtype_before_supertype",
                |w: &mut World| {
                    w.register(vec![
                        NodeTypeDefinition::new(n("Article")).extends(n("Content")),
                        NodeTypeDefinition::new(n("Content")),
                    ])
                },
                |a| a.rejected(ErrorKind::SchemaNotFound).error("Content"),
            )
            .step(
                "nothing_committed",
                |w: &mut World| w.resolve_property(&n("Content"), &[], PropertyQuery::named(n("x"))),
                |a| a.rejected(ErrorKind::SchemaNotFound),
            )
            .step(
                "supertype_first",
                |w: &mut World| {
                    w.register(vec![
                        NodeTypeDefinition::new(n("Content")),
                        NodeTypeDefinition::new(n("Article")).extends(n("Content")),
                    ])
                },
                |a| a.registered(2),
            )
            .step(
                "duplicate_rejected",
                |w: &mut World| w.register(vec![NodeTypeDefinition::new(n("Content"))]),
                |a| a.rejected(ErrorKind::InvalidDefinition).error("already registered"),
            )
    }

    #[test]
    fn test_batches_commit_in_order() {
        scenario().run().unwrap();
    }
}

mod partial_batches {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("partial_batches")
            .step(
                "second_candidate_invalid",
                |w: &mut World| {
                    w.register(vec![
                        NodeTypeDefinition::new(n("First")),
                        NodeTypeDefinition::new(n("Second"))
                            .property(prop("p", RequiredType::String).auto_created()),
                        NodeTypeDefinition::new(n("Third")),
                    ])
                },
                |a| a.rejected(ErrorKind::InvalidDefinition),
            )
            .step(
                "first_survives",
                |w: &mut World| w.register(vec![NodeTypeDefinition::new(n("First"))]),
                |a| a.rejected(ErrorKind::InvalidDefinition).error("already registered"),
            )
            .step(
                "third_was_not_attempted",
                |w: &mut World| w.register(vec![NodeTypeDefinition::new(n("Third"))]),
                |a| a.registered(1),
            )
    }

    #[test]
    fn test_failed_batch_keeps_earlier_commits() {
        scenario().run().unwrap();
    }
}

mod overrides {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("overrides")
            .step(
                "base",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("Event"))
                        .property(prop("when", RequiredType::String))
                        .property(prop("payload", RequiredType::Undefined))
                        .child_node(ChildNodeDefinition::new(n("detail")).requires(Name::nt("base")))])
                },
                |a| a.registered(1),
            )
            .step(
                "string_to_date",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("Dated"))
                        .extends(n("Event"))
                        .property(prop("when", RequiredType::Date))])
                },
                |a| a.rejected(ErrorKind::IllegalOverride),
            )
            .step(
                "undefined_to_string",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("TextEvent"))
                        .extends(n("Event"))
                        .property(prop("payload", RequiredType::String))])
                },
                |a| a.registered(1),
            )
            .step(
                "child_narrowed",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("FolderEvent"))
                        .extends(n("Event"))
                        .child_node(ChildNodeDefinition::new(n("detail")).requires(Name::nt("folder")))])
                },
                |a| a.registered(1),
            )
            .step(
                "child_widened_to_siblings",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("ManyEvent"))
                        .extends(n("Event"))
                        .child_node(
                            ChildNodeDefinition::new(n("detail"))
                                .requires(Name::nt("base"))
                                .same_name_siblings(),
                        )])
                },
                |a| a.rejected(ErrorKind::IllegalOverride),
            )
            .step(
                "resolved_override",
                |w: &mut World| w.resolve_property(&n("TextEvent"), &[], PropertyQuery::named(n("payload"))),
                |a| a.declared_by(n("TextEvent")).of_type(RequiredType::String),
            )
    }

    #[test]
    fn test_overrides_must_narrow() {
        scenario().run().unwrap();
    }
}

mod builtins {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("builtins")
            .step(
                "protected_primary_type",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("Sneaky"))
                        .property(PropertyDefinition::new(Name::jcr("primaryType"), RequiredType::Name))])
                },
                |a| a.rejected(ErrorKind::IllegalOverride).error("protected"),
            )
            .step(
                "file_with_resource",
                |w: &mut World| {
                    w.resolve_child_node(
                        &Name::nt("file"),
                        &[],
                        ChildNodeQuery::named(Name::jcr("content")).with_primary_type(Name::nt("resource")),
                    )
                },
                |a| a.declared_by(Name::nt("file")).exact(),
            )
            .step(
                "folder_rejects_resource_children",
                |w: &mut World| {
                    w.resolve_child_node(
                        &Name::nt("folder"),
                        &[],
                        ChildNodeQuery::named(n("doc")).with_primary_type(Name::nt("resource")),
                    )
                },
                |a| a.no_definition(),
            )
    }

    #[test]
    fn test_builtin_types_govern_content() {
        scenario().run().unwrap();
    }
}

mod constraint_checks {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("constraint_checks")
            .step(
                "unreadable_range",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("Bad"))
                        .property(prop("size", RequiredType::Long).with_constraint("big"))])
                },
                |a| a.rejected(ErrorKind::InvalidDefinition),
            )
            .step(
                "default_outside_range",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("Bad"))
                        .property(prop("size", RequiredType::Long).with_constraint("[0,10]").with_default(20i64))])
                },
                |a| a.rejected(ErrorKind::InvalidDefinition).error("does not satisfy"),
            )
            .step(
                "default_inside_range",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(n("Good"))
                        .property(prop("size", RequiredType::Long).with_constraint("[0,10]").with_default(5i64))])
                },
                |a| a.registered(1),
            )
    }

    #[test]
    fn test_constraints_checked_at_registration() {
        scenario().run().unwrap();
    }
}

#[test]
fn test_register_then_lookup_is_identical() {
    use pretty_assertions::assert_eq;

    let store = TypeStore::with_builtins().unwrap();
    let validator = RegistrationValidator::new(RegistryConfig::default());
    let definition = NodeTypeDefinition::new(n("Document"))
        .extends(Name::nt("hierarchyNode"))
        .extends(Name::mix("referenceable"))
        .orderable()
        .primary_item(n("body"))
        .property(prop("body", RequiredType::String).mandatory())
        .property(prop("tags", RequiredType::Name).multiple())
        .child_node(ChildNodeDefinition::new(n("attachments")).requires(Name::nt("folder")));

    validator.register(&store, definition.clone()).unwrap();

    assert_eq!(*store.get(&n("Document")).unwrap(), definition);
}
