//! Property-based tests for history growth and visited flags

use paper_router::router::Method;
use paper_router::types::{Generator, ItemKey, ItemSpec};
use paper_router::Connection;
use proptest::prelude::*;
use std::collections::BTreeSet;

const ITEMS: [u64; 4] = [60, 61, 62, 63];

fn generator() -> Generator {
    Generator::new(vec![
        vec![ItemSpec::single("post", ITEMS[0])],
        vec![
            ItemSpec::single("post", ITEMS[1]),
            ItemSpec::single("post", ITEMS[2]),
            ItemSpec::single("post", ITEMS[3]),
        ],
    ])
}

#[derive(Debug, Clone)]
enum Step {
    /// Select with the shared generator.
    Select(usize),
    /// Select with a generator of its own.
    Open(u64),
    /// Scan history for one of the shared items.
    Scan(usize, Method),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..ITEMS.len()).prop_map(Step::Select),
        (200u64..204).prop_map(Step::Open),
        (0..ITEMS.len(), prop_oneof![Just(Method::Forward), Just(Method::Backward)])
            .prop_map(|(i, method)| Step::Scan(i, method)),
    ]
}

fn visited_sets(connection: &Connection) -> Vec<BTreeSet<ItemKey>> {
    connection
        .router()
        .contexts()
        .iter()
        .map(|context| {
            ITEMS
                .iter()
                .copied()
                .chain(200..204)
                .map(|id| ItemSpec::single("post", id).key())
                .filter(|key| context.is_visited(key))
                .collect()
        })
        .collect()
}

proptest! {
    /// History grows only when a different generator is routed to
    #[test]
    fn test_history_growth(steps in prop::collection::vec(step(), 1..20)) {
        let mut connection = Connection::new();
        for step in steps {
            let before = connection.router().len();
            let current = connection
                .router()
                .selected_context()
                .map(|context| context.generator().clone());
            match step {
                Step::Select(i) => {
                    let generator = generator();
                    let changes = current.as_ref() != Some(&generator);
                    connection
                        .route_change_succeeded(&ItemSpec::single("post", ITEMS[i]), Some(&generator), None)
                        .unwrap();
                    prop_assert_eq!(connection.router().len(), before + usize::from(changes));
                }
                Step::Open(id) => {
                    let item = ItemSpec::single("post", id);
                    let generator = Generator::new(vec![vec![item.clone()]]);
                    let changes = current.as_ref() != Some(&generator);
                    connection
                        .route_change_succeeded(&item, Some(&generator), None)
                        .unwrap();
                    prop_assert_eq!(connection.router().len(), before + usize::from(changes));
                }
                Step::Scan(i, method) => {
                    let result = connection.route_change_succeeded(
                        &ItemSpec::single("post", ITEMS[i]),
                        None,
                        Some(method),
                    );
                    // An empty history starts from the item alone.
                    prop_assert_eq!(connection.router().len(), before.max(1));
                    if result.is_ok() {
                        prop_assert_eq!(
                            connection.selected_item().unwrap().key(),
                            ItemSpec::single("post", ITEMS[i]).key()
                        );
                    }
                }
            }
        }
    }

    /// A context never forgets an item it has visited
    #[test]
    fn test_visited_is_monotonic(steps in prop::collection::vec(step(), 1..20)) {
        let mut connection = Connection::new();
        let mut previous: Vec<BTreeSet<ItemKey>> = Vec::new();
        for step in steps {
            let _ = match step {
                Step::Select(i) => connection.route_change_succeeded(
                    &ItemSpec::single("post", ITEMS[i]),
                    Some(&generator()),
                    None,
                ),
                Step::Open(id) => {
                    let item = ItemSpec::single("post", id);
                    connection.route_change_succeeded(&item, Some(&Generator::new(vec![vec![item.clone()]])), None)
                }
                Step::Scan(i, method) => connection.route_change_succeeded(
                    &ItemSpec::single("post", ITEMS[i]),
                    None,
                    Some(method),
                ),
            };
            let current = visited_sets(&connection);
            for (before, after) in previous.iter().zip(&current) {
                prop_assert!(before.is_subset(after));
            }
            previous = current;
        }
    }

    /// Move, add and replace always leave exactly one context
    #[test]
    fn test_structural_commands_collapse(opens in 1usize..5, pick in 0..ITEMS.len()) {
        let mut connection = Connection::new();
        connection
            .route_change_succeeded(&ItemSpec::single("post", ITEMS[0]), Some(&generator()), None)
            .unwrap();
        for id in 0..opens as u64 {
            let item = ItemSpec::single("post", 300 + id);
            connection
                .route_change_succeeded(&item, Some(&Generator::new(vec![vec![item.clone()]])), None)
                .unwrap();
        }
        prop_assert_eq!(connection.router().len(), opens + 1);

        connection.add_item_to_column(&ItemSpec::single("post", 999)).unwrap();
        prop_assert_eq!(connection.router().len(), 1);

        connection.replace_context(&generator()).unwrap();
        prop_assert_eq!(connection.router().len(), 1);

        connection
            .route_change_succeeded(&ItemSpec::single("post", ITEMS[0]), None, None)
            .unwrap();
        if pick > 0 {
            connection.move_item_to_column(&ItemSpec::single("post", ITEMS[pick])).unwrap();
            prop_assert_eq!(connection.router().len(), 1);
        }
    }
}
