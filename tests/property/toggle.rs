use formcheck::{FormController, RuleSchema};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Adding then removing a new member restores the original data
    #[test]
    fn toggle_round_trip(
        members in prop::collection::btree_set("[a-e]", 0..5),
        item in "[a-h]",
    ) {
        prop_assume!(!members.contains(&item));
        let members: Vec<&String> = members.iter().collect();
        let mut form = FormController::new(
            json!({ "set": members }),
            RuleSchema::new().field("set", "array|in:a,b,c,d,e"),
        );
        form.validate().unwrap();
        let data = form.data().clone();
        let errors = form.errors().clone();

        prop_assert!(form.toggle_set_membership("set", item.as_str(), true).unwrap());
        prop_assert!(form.toggle_set_membership("set", item.as_str(), false).unwrap());

        prop_assert_eq!(form.data(), &data);
        form.validate().unwrap();
        prop_assert_eq!(form.errors(), &errors);
    }

    // Toggling to the current membership is a no-op
    #[test]
    fn toggle_is_idempotent(
        members in prop::collection::btree_set("[a-e]", 0..5),
        item in "[a-e]",
        present in any::<bool>(),
    ) {
        let members: Vec<&String> = members.iter().collect();
        let mut form = FormController::new(json!({ "set": members }), RuleSchema::new());
        form.toggle_set_membership("set", item.as_str(), present).unwrap();
        let revision = form.revision();
        let data = form.data().clone();
        prop_assert!(!form.toggle_set_membership("set", item.as_str(), present).unwrap());
        prop_assert_eq!(form.revision(), revision);
        prop_assert_eq!(form.data(), &data);
    }
}
