//! Failure message templates and custom overrides.
//!
//! Templates use `:attribute` for the field and `:name` placeholders for rule
//! parameters. Size rules have one template per [`SizeKind`].

use crate::enums::SizeKind;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fallback when neither an override nor a default template exists.
pub const FALLBACK_TEMPLATE: &str = "The :attribute field is invalid.";

/// Default English template for a built-in rule.
pub fn default_template(rule: &str, size: SizeKind) -> Option<&'static str> {
    let template = match (rule, size) {
        ("required", _) => "The :attribute field is required.",
        ("required_if", _) => "The :attribute field is required when :other is :value.",
        ("required_unless", _) => {
            "The :attribute field is required unless :other is in :values."
        }
        ("required_with", _) => "The :attribute field is required when :values is present.",
        ("required_with_all", _) => {
            "The :attribute field is required when :values are present."
        }
        ("required_without", _) => {
            "The :attribute field is required when :values is not present."
        }
        ("accepted", _) => "The :attribute must be accepted.",
        ("string", _) => "The :attribute must be a string.",
        ("integer", _) => "The :attribute must be an integer.",
        ("numeric", _) => "The :attribute must be a number.",
        ("boolean", _) => "The :attribute field must be true or false.",
        ("array", _) => "The :attribute must be an array.",
        ("object", _) => "The :attribute must be an object.",
        ("email", _) => "The :attribute must be a valid email address.",
        ("alpha", _) => "The :attribute must only contain letters.",
        ("alpha_num", _) => "The :attribute must only contain letters and numbers.",
        ("alpha_dash", _) => {
            "The :attribute must only contain letters, numbers, dashes and underscores."
        }
        ("digits", _) => "The :attribute must be :digits digits.",
        ("regex", _) => "The :attribute format is invalid.",
        ("in", _) | ("not_in", _) => "The selected :attribute is invalid.",
        ("same", _) => "The :attribute and :other must match.",
        ("different", _) => "The :attribute and :other must be different.",
        ("confirmed", _) => "The :attribute confirmation does not match.",
        ("min", SizeKind::Numeric) => "The :attribute must be at least :min.",
        ("min", SizeKind::String) => "The :attribute must be at least :min characters.",
        ("min", SizeKind::Array) => "The :attribute must have at least :min items.",
        ("max", SizeKind::Numeric) => "The :attribute must not be greater than :max.",
        ("max", SizeKind::String) => "The :attribute must not be greater than :max characters.",
        ("max", SizeKind::Array) => "The :attribute must not have more than :max items.",
        ("between", SizeKind::Numeric) => "The :attribute must be between :min and :max.",
        ("between", SizeKind::String) => {
            "The :attribute must be between :min and :max characters."
        }
        ("between", SizeKind::Array) => "The :attribute must have between :min and :max items.",
        ("size", SizeKind::Numeric) => "The :attribute must be :size.",
        ("size", SizeKind::String) => "The :attribute must be :size characters.",
        ("size", SizeKind::Array) => "The :attribute must contain :size items.",
        _ => return None,
    };
    Some(template)
}

/// Custom message templates and attribute display names.
///
/// Template keys are tried in order: `<schema path>.<rule>`,
/// `<concrete path>.<rule>`, `<schema path>`, `<concrete path>`, `<rule>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
    /// Display names substituted for `:attribute`, keyed by schema or
    /// concrete path.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Messages {
    pub fn new() -> Self {
        Messages::default()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty() && self.attributes.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    pub fn insert_attribute(&mut self, path: impl Into<String>, name: impl Into<String>) {
        self.attributes.insert(path.into(), name.into());
    }

    /// Override for this rule at this path, if any.
    pub fn template_for(&self, pattern: &Path, path: &Path, rule: &str) -> Option<&str> {
        let pattern = pattern.to_string();
        let path = path.to_string();
        [
            format!("{}.{}", pattern, rule),
            format!("{}.{}", path, rule),
            pattern,
            path,
            rule.to_string(),
        ]
        .iter()
        .find_map(|key| self.templates.get(key))
        .map(String::as_str)
    }

    /// Text substituted for `:attribute`.
    pub fn attribute_name(&self, pattern: &Path, path: &Path) -> String {
        self.attributes
            .get(&path.to_string())
            .or_else(|| self.attributes.get(&pattern.to_string()))
            .cloned()
            .unwrap_or_else(|| path.to_string().replace('_', " "))
    }

    pub fn extend(&mut self, other: Messages) {
        self.templates.extend(other.templates);
        self.attributes.extend(other.attributes);
    }
}

/// Substitutes `:name` placeholders. Longer names are replaced first so that
/// `:values` is not clobbered by `:value`.
pub fn render(template: &str, replacements: &[(String, String)]) -> String {
    let mut ordered: Vec<&(String, String)> = replacements.iter().collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    let mut out = template.to_string();
    for (name, value) in ordered {
        out = out.replace(&format!(":{}", name), value);
    }
    out
}
