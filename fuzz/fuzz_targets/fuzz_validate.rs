#![no_main]

use formcheck::{FormController, RuleSchema};
use libfuzzer_sys::fuzz_target;

// A fixed schema exercising wildcards and cross-field references against
// arbitrary data.
fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let schema = RuleSchema::new()
        .field("name", "required|string|between:2,40")
        .field("age", "nullable|integer|min:0")
        .field("items.*.sku", "required_with:items.*.qty|alpha_dash")
        .field("items.*.qty", "numeric|min:1")
        .field("groups.*.members.*", "email")
        .field("tags", "array|in:a,b,c");

    let mut form = FormController::new(value, schema);
    let valid = form.validate().expect("fixed schema compiles");
    assert_eq!(valid, form.errors().is_empty());

    let _ = form.remove_list_item("items");
    let _ = form.toggle_set_membership("tags", "a", true);
    let _ = form.validate_path("items");
});
