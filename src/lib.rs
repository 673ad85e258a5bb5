//! Path-addressable validation for nested, list-shaped form state.
//!
//! Form data is a persistent [`Node`] tree addressed by dotted paths
//! (`profile.addresses.0.street`). A [`RuleSchema`] attaches ordered rules to
//! paths, where `*` stands for every current element of a sequence. Each pass
//! expands the schema against the data, evaluates it, and indexes the
//! failures by path:
//!
//! ```text
//! RuleSchema + data → engine::expand → ResolvedRuleSet → engine::evaluate → ErrorIndex
//! ```
//!
//! A [`FormController`] owns the data and the index and applies the events a
//! form produces (field change, list append/remove, checkbox toggle,
//! validate).
//!
//! # Quick Start
//!
//! ```rust
//! use formcheck::{FormController, RuleSchema};
//! use serde_json::json;
//!
//! let schema = RuleSchema::new()
//!     .field("name", "required|string|min:3")
//!     .field("addresses.*.city", ["required_without:addresses.*.zip", "min:5"])
//!     .field("addresses.*.zip", ["required_without:addresses.*.city", "digits:5"]);
//!
//! let mut form = FormController::new(
//!     json!({ "name": "", "addresses": [{ "city": "", "zip": "" }] }),
//!     schema,
//! );
//!
//! assert!(!form.validate().unwrap());
//! assert_eq!(form.errors().first("name"), Some("The name field is required."));
//!
//! form.change("name", "Ada").unwrap();
//! form.change("addresses.0.city", "Berlin").unwrap();
//! assert!(form.validate().unwrap());
//! ```

pub mod accessor;
pub mod config;
pub mod controller;
pub mod engine;
pub mod enums;
pub mod error;
pub mod error_index;
pub mod load;
pub mod messages;
pub mod node;
pub mod path;
pub mod predicates;
pub mod rules;
pub mod schema;

pub use config::FormConfig;
pub use controller::{FormController, FormState};
pub use engine::{Failure, ResolvedRuleSet, evaluate, expand};
pub use enums::ValidationTrigger;
pub use error::*;
pub use error_index::ErrorIndex;
pub use node::Node;
pub use path::{Path, Segment};
pub use predicates::{Password, rule_in, rule_not_in};
pub use rules::{Predicate, PredicateContext};
pub use schema::{RuleList, RuleSchema, RuleSpec};

/// One-shot validation: expand, evaluate, and index the failures.
///
/// # Errors
///
/// Returns the [`SchemaError`] if the schema does not compile.
pub fn check(data: &Node, schema: &RuleSchema) -> Result<ErrorIndex, SchemaError> {
    Ok(ErrorIndex::from_failures(engine::run(schema, data)?))
}

/// Builds a controller from a YAML form definition.
///
/// # Errors
///
/// Returns [`LoadError`] for malformed YAML, unknown top-level keys, or a
/// schema with an invalid shape. Rule names are checked on the first
/// validation pass.
///
/// # Example
///
/// ```rust
/// let yaml = r#"
/// validate_on: submit
/// data:
///   email: ""
/// rules:
///   email: required|email
/// "#;
///
/// let mut form = formcheck::load(yaml).expect("valid definition");
/// assert!(!form.validate().unwrap());
/// assert!(form.errors().has("email"));
/// ```
pub fn load(input: &str) -> Result<FormController, LoadError> {
    let def = load::parse_definition(input)?;
    Ok(FormController::with_config(def.data, def.schema, def.config))
}
