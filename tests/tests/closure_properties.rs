//! Property tests for effective type closures over random hierarchies.

use arbor_tests::prelude::*;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::{HashMap, HashSet, VecDeque};

/// Random hierarchy: type `i` may extend any of the types before it.
fn hierarchy() -> impl Strategy<Value = Vec<NodeTypeDefinition>> {
    prop::collection::vec(prop::collection::vec(any::<Index>(), 0..3), 1..10).prop_map(|picks| {
        picks
            .iter()
            .enumerate()
            .map(|(i, choices)| {
                let mut definition = NodeTypeDefinition::new(n(&format!("T{}", i)));
                if i > 0 {
                    let mut seen = HashSet::new();
                    for choice in choices {
                        let parent = choice.index(i);
                        if seen.insert(parent) {
                            definition = definition.extends(n(&format!("T{}", parent)));
                        }
                    }
                }
                definition
            })
            .collect()
    })
}

fn registered(definitions: Vec<NodeTypeDefinition>) -> TypeStore {
    let store = TypeStore::new();
    RegistrationValidator::new(RegistryConfig::default())
        .register_batch(&store, definitions)
        .unwrap();
    store
}

/// Shortest supertype distance from `start` to every ancestor.
fn distances(table: &TypeTable, start: &Name) -> HashMap<Name, usize> {
    let mut result = HashMap::new();
    let mut queue = VecDeque::new();
    result.insert(start.clone(), 0);
    queue.push_back(start.clone());
    while let Some(current) = queue.pop_front() {
        let distance = result[&current];
        for supertype in table.supertypes(&current).unwrap_or(&[]) {
            if !result.contains_key(supertype) {
                result.insert(supertype.clone(), distance + 1);
                queue.push_back(supertype.clone());
            }
        }
    }
    result
}

proptest! {
    #[test]
    fn prop_closure_lists_each_ancestor_once_at_min_distance(definitions in hierarchy()) {
        let names: Vec<Name> = definitions.iter().map(|d| d.name.clone()).collect();
        let store = registered(definitions);
        let table = store.snapshot();

        for name in &names {
            let closure = EffectiveType::resolve(&table, name, &[]).unwrap();
            let entries = closure.entries();

            prop_assert_eq!(&entries[0].node_type.name, name);
            prop_assert!(entries.windows(2).all(|w| w[0].distance <= w[1].distance));

            let listed: HashSet<Name> = closure.names().into_iter().collect();
            prop_assert_eq!(listed.len(), entries.len());

            let expected = distances(&table, name);
            prop_assert_eq!(listed, expected.keys().cloned().collect::<HashSet<_>>());
            for entry in entries {
                prop_assert_eq!(entry.distance, expected[&entry.node_type.name]);
                prop_assert!(table.is_node_type(name, &entry.node_type.name));
            }
        }
    }

    #[test]
    fn prop_direct_supertypes_keep_declaration_order(definitions in hierarchy()) {
        let last = definitions.last().cloned();
        let store = registered(definitions);
        let Some(last) = last else { return Ok(()); };

        let closure = EffectiveType::resolve(&store.snapshot(), &last.name, &[]).unwrap();
        let direct: Vec<Name> = closure
            .entries()
            .iter()
            .filter(|e| e.distance == 1)
            .map(|e| e.node_type.name.clone())
            .collect();
        prop_assert_eq!(direct, last.supertypes.clone());
    }

    #[test]
    fn prop_registered_definitions_round_trip(definitions in hierarchy()) {
        let store = registered(definitions.clone());
        for definition in &definitions {
            let stored = store.get(&definition.name).unwrap();
            prop_assert_eq!(&*stored, definition);
        }
    }
}
