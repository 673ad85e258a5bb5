use formcheck::accessor::{clone_deep, get, set};
use formcheck::{Node, Path, Segment};
use proptest::prelude::*;
use serde_json::{Value, json};

/// Strategy for arbitrary JSON values nested up to `depth` levels.
fn arb_json(depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|i| json!(i)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];

    leaf.prop_recursive(depth, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-c]", inner), 1..4).prop_map(|pairs| {
                let map: serde_json::Map<String, Value> = pairs.into_iter().collect();
                Value::Object(map)
            }),
        ]
    })
}

/// Concrete paths over a small alphabet so that they often hit existing data.
fn arb_path() -> impl Strategy<Value = Path> {
    let segment = prop_oneof![
        "[a-c]".prop_map(Segment::Field),
        (0usize..3).prop_map(Segment::Index),
    ];
    prop::collection::vec(segment, 0..4).prop_map(Path::from_segments)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // get(set(S, p, v), p) == v whenever the write is structurally possible
    #[test]
    fn get_after_set_returns_written_value(
        data in arb_json(3),
        path in arb_path(),
        value in arb_json(1),
    ) {
        let root = Node::from(data);
        let value = Node::from(value);
        if let Ok(next) = set(&root, &path, value.clone()) {
            prop_assert_eq!(get(&next, &path), Some(&value), "path {}", path);
        }
    }

    // set never modifies its input
    #[test]
    fn set_leaves_input_unchanged(
        data in arb_json(3),
        path in arb_path(),
        value in arb_json(1),
    ) {
        let root = Node::from(data.clone());
        let _ = set(&root, &path, Node::from(value));
        prop_assert_eq!(root.to_value(), data);
    }

    // Top-level entries off the written path are carried over unchanged
    #[test]
    fn set_preserves_siblings(
        data in arb_json(3),
        path in arb_path(),
        value in arb_json(1),
    ) {
        let root = Node::from(data);
        let Ok(next) = set(&root, &path, Node::from(value)) else {
            return Ok(());
        };
        let (Some(Segment::Field(head)), Some(old)) = (path.segments().first(), root.as_object()) else {
            return Ok(());
        };
        for (key, child) in old {
            if key != head {
                let carried = get(&next, &Path::root().field(key));
                prop_assert_eq!(carried, Some(child), "sibling {} changed", key);
            }
        }
    }

    // clone_deep is structurally equal to its input
    #[test]
    fn clone_deep_is_equal(data in arb_json(3)) {
        let root = Node::from(data);
        prop_assert_eq!(clone_deep(&root), root);
    }
}
