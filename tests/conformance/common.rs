use formcheck::{ErrorIndex, Node, RuleSchema};
use serde_json::Value;
use std::path::PathBuf;

pub fn fixtures_dir() -> PathBuf {
    std::env::var("FORMCHECK_FIXTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

/// Builds a schema from a `json!` literal.
pub fn schema(rules: Value) -> RuleSchema {
    RuleSchema::from_value(&rules).expect("schema shape should be valid")
}

/// One-shot validation that panics on schema errors.
pub fn check(data: Value, rules: Value) -> ErrorIndex {
    formcheck::check(&Node::from(data), &schema(rules)).expect("schema should compile")
}

/// Failing paths in index order.
pub fn failing_paths(errors: &ErrorIndex) -> Vec<String> {
    errors.paths().map(str::to_string).collect()
}
