use formcheck::engine::Failure;
use formcheck::{ErrorIndex, Path};
use proptest::prelude::*;

fn arb_path_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof!["[a-b]", "[0-1]"], 1..4).prop_map(|s| s.join("."))
}

fn failure(path: &str, message: &str) -> Failure {
    Failure {
        path: Path::parse(path).unwrap(),
        rule: "required".to_string(),
        message: message.to_string(),
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix || path.starts_with(&format!("{}.", prefix))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // forget removes exactly the prefix and its descendants
    #[test]
    fn forget_removes_only_the_subtree(
        paths in prop::collection::vec(arb_path_text(), 0..10),
        prefix in arb_path_text(),
    ) {
        let mut index: ErrorIndex = paths.iter().map(|p| failure(p, "x")).collect();
        index.forget(&prefix);
        prop_assert!(!index.has_under(&prefix));
        for p in &paths {
            prop_assert_eq!(index.has(p), !under(p, &prefix), "path {} prefix {}", p, prefix);
        }
    }

    // merge_scoped never touches paths outside its scope
    #[test]
    fn merge_scoped_preserves_outside(
        before in prop::collection::vec(arb_path_text(), 0..10),
        fresh in prop::collection::vec(arb_path_text(), 0..10),
        prefix in arb_path_text(),
    ) {
        let original: ErrorIndex = before.iter().map(|p| failure(p, "old")).collect();
        let mut index = original.clone();
        index.merge_scoped(&prefix, fresh.iter().map(|p| failure(p, "new")));

        for p in before.iter().filter(|p| !under(p, &prefix)) {
            prop_assert_eq!(index.all(p), original.all(p));
        }
        for p in fresh.iter().filter(|p| under(p, &prefix)) {
            prop_assert!(index.all(p).iter().all(|m| m == "new"));
        }
    }

    // Messages for a path keep insertion order
    #[test]
    fn messages_keep_order(count in 1usize..6) {
        let index: ErrorIndex = (0..count).map(|i| failure("a", &i.to_string())).collect();
        let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        prop_assert_eq!(index.all("a"), expected.as_slice());
        prop_assert_eq!(index.first("a"), Some("0"));
    }
}
