//! Closed enumerations shared by the rule registry, the engine, and the
//! controller configuration.

use serde::{Deserialize, Serialize};

/// How a rule takes part in evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleClass {
    /// Modifies evaluation of the path (`bail`, `nullable`, `sometimes`) and
    /// never fails.
    Flag,
    /// Runs even when the value is absent or blank (the `required` family).
    Implicit,
    /// Skipped when the value is absent or blank.
    Regular,
}

/// How a rule parameter is parsed when the schema is compiled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Number,
    /// A path into the same snapshot; wildcards bind to the owning path's
    /// indices.
    Path,
    Pattern,
}

/// What a size rule (`min`, `max`, `between`, `size`) measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeKind {
    Numeric,
    String,
    Array,
}

/// When the controller re-runs validation on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationTrigger {
    /// Only on an explicit `validate()`.
    #[default]
    Submit,
    /// After every write, scoped to the written path.
    Change,
    /// When a field reports blur, scoped to that field.
    Blur,
}
