use formcheck::{Path, Segment};
use proptest::prelude::*;

fn arb_segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_]{0,7}".prop_map(Segment::Field),
        any::<u16>().prop_map(|i| Segment::Index(i as usize)),
        Just(Segment::Wildcard),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Display and parse are inverses
    #[test]
    fn display_parse_round_trip(segments in prop::collection::vec(arb_segment(), 0..6)) {
        let path = Path::from_segments(segments);
        let text = path.to_string();
        prop_assert_eq!(Path::parse(&text).unwrap(), path);
    }

    // Parsing arbitrary text never panics; empty segments are the only error
    #[test]
    fn parse_rejects_only_empty_segments(text in "[a-z0-9.*]{0,16}") {
        let result = Path::parse(&text);
        let has_empty = !text.is_empty() && text.split('.').any(str::is_empty);
        prop_assert_eq!(result.is_err(), has_empty, "text {:?}", text);
    }

    // bind removes every wildcard when given enough indices
    #[test]
    fn bind_produces_concrete_paths(
        segments in prop::collection::vec(arb_segment(), 0..6),
        indices in prop::collection::vec(0usize..10, 6),
    ) {
        let pattern = Path::from_segments(segments);
        let bound = pattern.bind(&indices).unwrap();
        prop_assert!(bound.is_concrete());
        prop_assert!(pattern.matches(&bound));
        prop_assert_eq!(bound.len(), pattern.len());
    }
}
