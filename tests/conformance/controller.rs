use super::common::schema;
use formcheck::{
    ErrorIndex, FormConfig, FormController, FormError, InvalidPathError, Node, SchemaError,
    ValidationTrigger,
};
use serde_json::json;
use std::sync::Arc;

fn form(trigger: ValidationTrigger) -> FormController {
    FormController::with_config(
        json!({
            "name": "",
            "age": "",
            "tags": [],
            "items": [{ "title": "" }, { "title": "" }]
        }),
        schema(json!({
            "name": "required|string|min:3",
            "age": "required|integer|min:18",
            "items.*.title": "required"
        })),
        FormConfig::validate_on(trigger),
    )
}

// ─── change ─────────────────────────────────────────────────────────────────

#[test]
fn change_writes_and_bumps_revision() {
    let mut form = form(ValidationTrigger::Submit);
    form.change("name", "Ada").unwrap();
    assert_eq!(form.value("name"), Some(&Node::from("Ada")));
    assert_eq!(form.revision(), 1);
    assert!(form.errors().is_empty(), "submit mode must not validate on change");
}

#[test]
fn rejected_change_leaves_state_untouched() {
    let mut form = form(ValidationTrigger::Submit);
    let before = form.state();

    let err = form.change("name.first", "A").unwrap_err();
    assert!(matches!(
        err,
        FormError::InvalidPath(InvalidPathError::NotAContainer { .. })
    ));
    let err = form.change("items.5.title", "A").unwrap_err();
    assert!(matches!(
        err,
        FormError::InvalidPath(InvalidPathError::Sparse { .. })
    ));
    assert!(matches!(
        form.change("a..b", 1),
        Err(FormError::InvalidPath(InvalidPathError::Syntax(_)))
    ));

    assert_eq!(form.data(), &before.data);
    assert_eq!(form.revision(), before.revision);
}

#[test]
fn change_mode_validates_only_the_written_field() {
    let mut form = form(ValidationTrigger::Change);
    form.change("name", "Al").unwrap();
    assert_eq!(
        form.errors().first("name"),
        Some("The name must be at least 3 characters.")
    );
    assert!(!form.errors().has("age"));

    form.change("name", "Alan").unwrap();
    assert!(!form.errors().has("name"));
}

#[test]
fn change_mode_keeps_errors_outside_the_written_field() {
    let mut form = form(ValidationTrigger::Change);
    assert!(!form.validate().unwrap());
    assert!(form.errors().has("age"));

    form.change("name", "Alan").unwrap();
    assert!(!form.errors().has("name"));
    assert!(form.errors().has("age"));
    assert!(form.errors().has("items.0.title"));
}

fn address_form(trigger: ValidationTrigger) -> FormController {
    FormController::with_config(
        json!({
            "password": "",
            "password_confirmation": "",
            "addresses": [{ "city": "", "zip": "" }, { "city": "", "zip": "" }]
        }),
        schema(json!({
            "password": "required|confirmed",
            "addresses.*.city": "required_without:addresses.*.zip",
            "addresses.*.zip": "required_without:addresses.*.city"
        })),
        FormConfig::validate_on(trigger),
    )
}

fn full_check(form: &FormController) -> ErrorIndex {
    let schema = schema(json!({
        "password": "required|confirmed",
        "addresses.*.city": "required_without:addresses.*.zip",
        "addresses.*.zip": "required_without:addresses.*.city"
    }));
    formcheck::check(form.data(), &schema).unwrap()
}

#[test]
fn change_mode_rechecks_rules_that_reference_the_written_field() {
    let mut form = address_form(ValidationTrigger::Change);
    assert!(!form.validate().unwrap());
    assert!(form.errors().has("addresses.0.zip"));

    form.change("addresses.0.city", "Berlin").unwrap();
    assert!(!form.errors().has("addresses.0.city"));
    assert!(!form.errors().has("addresses.0.zip"));
    assert!(form.errors().has("addresses.1.zip"));
    assert_eq!(form.errors().paths().count(), full_check(&form).paths().count());

    form.change("addresses.0.city", "").unwrap();
    assert!(form.errors().has("addresses.0.zip"));
}

#[test]
fn change_mode_rechecks_confirmed_when_the_twin_changes() {
    let mut form = address_form(ValidationTrigger::Change);
    form.change("password", "hunter22").unwrap();
    assert!(form.errors().has("password"));

    form.change("password_confirmation", "hunter22").unwrap();
    assert!(!form.errors().has("password"));
}

#[test]
fn change_mode_matches_a_full_pass_after_each_write() {
    let mut form = address_form(ValidationTrigger::Change);
    form.validate().unwrap();
    let writes = [
        ("addresses.1.zip", "10115"),
        ("addresses.0.city", "Lisbon"),
        ("addresses.1.zip", ""),
        ("password", "x"),
        ("password_confirmation", "x"),
    ];
    for (path, value) in writes {
        form.change(path, value).unwrap();
        let mut published: Vec<&str> = form.errors().paths().collect();
        let expected = full_check(&form);
        let mut fresh: Vec<&str> = expected.paths().collect();
        published.sort_unstable();
        fresh.sort_unstable();
        assert_eq!(published, fresh, "after writing {path}");
    }
}

#[test]
fn validate_path_refreshes_referencing_entries() {
    let mut form = address_form(ValidationTrigger::Submit);
    form.validate().unwrap();
    form.change("addresses.1.city", "Porto").unwrap();
    assert!(form.errors().has("addresses.1.zip"));

    assert!(form.validate_path("addresses.1.city").unwrap());
    assert!(!form.errors().has("addresses.1.zip"));
    assert!(form.errors().has("addresses.0.zip"));
}

// ─── blur ───────────────────────────────────────────────────────────────────

#[test]
fn blur_validates_only_in_blur_or_change_mode() {
    let mut submit = form(ValidationTrigger::Submit);
    submit.blur("name").unwrap();
    assert!(submit.errors().is_empty());

    let mut blur = form(ValidationTrigger::Blur);
    blur.change("name", "Al").unwrap();
    assert!(blur.errors().is_empty());
    blur.blur("name").unwrap();
    assert!(blur.errors().has("name"));
    assert!(!blur.errors().has("age"));
}

// ─── validate ───────────────────────────────────────────────────────────────

#[test]
fn validate_reports_validity() {
    let mut form = form(ValidationTrigger::Submit);
    assert!(!form.validate().unwrap());
    assert_eq!(
        form.errors().paths().collect::<Vec<_>>(),
        ["name", "age", "items.0.title", "items.1.title"]
    );

    form.change("name", "Ada").unwrap();
    form.change("age", 30).unwrap();
    form.change("items.0.title", "One").unwrap();
    form.change("items.1.title", "Two").unwrap();
    assert!(form.validate().unwrap());
    assert!(form.errors().is_empty());
}

#[test]
fn validate_path_scopes_to_subtree() {
    let mut form = form(ValidationTrigger::Submit);
    assert!(!form.validate_path("items").unwrap());
    assert_eq!(
        form.errors().paths().collect::<Vec<_>>(),
        ["items.0.title", "items.1.title"]
    );

    form.change("items.1.title", "Two").unwrap();
    assert!(form.validate_path("items.1").unwrap());
    assert!(!form.errors().has("items.1.title"));
    assert!(form.errors().has("items.0.title"));
}

#[test]
fn schema_error_aborts_validation() {
    let mut form = FormController::new(
        json!({ "name": "" }),
        schema(json!({ "name": "required|nonsense" })),
    );
    let err = form.validate().unwrap_err();
    assert!(matches!(err, SchemaError::UnknownRule { .. }));
    assert!(form.errors().is_empty());
    assert_eq!(form.revision(), 0);
}

#[test]
fn schema_error_rejects_change_in_change_mode() {
    let mut form = FormController::with_config(
        json!({ "name": "" }),
        schema(json!({ "name": "min" })),
        FormConfig::validate_on(ValidationTrigger::Change),
    );
    let err = form.change("name", "Ada").unwrap_err();
    assert!(matches!(err, FormError::Schema(SchemaError::Arity { .. })));
    assert_eq!(form.value("name"), Some(&Node::from("")));
}

// ─── list events ────────────────────────────────────────────────────────────

#[test]
fn add_list_item_returns_new_index() {
    let mut form = form(ValidationTrigger::Submit);
    assert_eq!(form.add_list_item("items", json!({ "title": "" })).unwrap(), 2);
    assert_eq!(form.add_list_item("fresh", "x").unwrap(), 0);
    assert_eq!(form.value("fresh").unwrap().to_value(), json!(["x"]));
}

#[test]
fn add_list_item_on_scalar_is_rejected() {
    let mut form = form(ValidationTrigger::Submit);
    let err = form.add_list_item("name", "x").unwrap_err();
    assert!(matches!(
        err,
        FormError::InvalidPath(InvalidPathError::NotASequence { .. })
    ));
    assert_eq!(form.revision(), 0);
}

#[test]
fn remove_list_item_forgets_removed_subtree() {
    let mut form = form(ValidationTrigger::Submit);
    form.validate().unwrap();
    assert!(form.errors().has("items.1.title"));

    let removed = form.remove_list_item("items").unwrap();
    assert_eq!(removed.unwrap().to_value(), json!({ "title": "" }));
    assert!(!form.errors().has_under("items.1"));
    assert!(form.errors().has("items.0.title"));
    assert!(form.errors().has("name"));
}

#[test]
fn remove_from_empty_list_is_noop() {
    let mut form = form(ValidationTrigger::Submit);
    assert_eq!(form.remove_list_item("tags").unwrap(), None);
    assert_eq!(form.remove_list_item("missing").unwrap(), None);
    assert_eq!(form.revision(), 0);
}

#[test]
fn null_list_behaves_as_empty_for_every_list_event() {
    let mut form = FormController::new(json!({ "tags": null }), schema(json!({})));
    assert_eq!(form.remove_list_item("tags").unwrap(), None);
    assert_eq!(form.revision(), 0);
    assert!(!form.toggle_set_membership("tags", "x", false).unwrap());
    assert_eq!(form.add_list_item("tags", "x").unwrap(), 0);
    assert_eq!(form.remove_list_item("tags").unwrap(), Some(Node::from("x")));
}

// ─── toggle ─────────────────────────────────────────────────────────────────

#[test]
fn toggle_adds_and_removes_once() {
    let mut form = form(ValidationTrigger::Submit);
    assert!(form.toggle_set_membership("tags", "rust", true).unwrap());
    assert!(!form.toggle_set_membership("tags", "rust", true).unwrap());
    assert_eq!(form.value("tags").unwrap().to_value(), json!(["rust"]));

    assert!(form.toggle_set_membership("tags", "rust", false).unwrap());
    assert!(!form.toggle_set_membership("tags", "rust", false).unwrap());
    assert_eq!(form.value("tags").unwrap().to_value(), json!([]));
}

#[test]
fn toggle_compares_numbers_loosely() {
    let mut form = FormController::new(json!({ "ids": [1, 2] }), schema(json!({})));
    assert!(form.toggle_set_membership("ids", 2.0, false).unwrap());
    assert_eq!(form.value("ids").unwrap().to_value(), json!([1]));
}

#[test]
fn toggle_on_scalar_is_rejected() {
    let mut form = form(ValidationTrigger::Submit);
    let err = form.toggle_set_membership("name", "x", true).unwrap_err();
    assert!(matches!(
        err,
        FormError::InvalidPath(InvalidPathError::NotASequence { found: "string", .. })
    ));
}

// ─── published state ────────────────────────────────────────────────────────

#[test]
fn earlier_state_snapshots_are_unaffected() {
    let mut form = form(ValidationTrigger::Submit);
    let before = form.state();
    form.validate().unwrap();
    form.change("name", "Ada").unwrap();

    assert!(before.errors.is_empty());
    assert_eq!(before.data.to_value()["name"], json!(""));
    assert_eq!(form.value("name"), Some(&Node::from("Ada")));
    assert!(!form.errors().is_empty());
}

#[test]
fn change_without_validation_shares_error_index() {
    let mut form = form(ValidationTrigger::Submit);
    form.validate().unwrap();
    let before = form.state();
    form.change("name", "Ada").unwrap();
    assert!(Arc::ptr_eq(&before.errors, &form.state().errors));
}

#[test]
fn replace_data_clears_errors() {
    let mut form = form(ValidationTrigger::Submit);
    form.validate().unwrap();
    form.replace_data(json!({ "name": "Ada" }));
    assert!(form.errors().is_empty());
    assert_eq!(form.value("name"), Some(&Node::from("Ada")));
}
