//! Rule schema authoring.
//!
//! A [`RuleSchema`] maps path text (wildcards allowed) to an ordered rule
//! list. Names and parameters are not checked here; the engine compiles the
//! schema before every pass and reports problems as [`SchemaError`]s.

use crate::error::{LoadError, SchemaError};
use crate::messages::Messages;
use crate::predicates::{Password, RuleIn};
use crate::rules::Predicate;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ─── RuleSpec ───────────────────────────────────────────────────────────────

/// One rule attached to a path.
#[derive(Clone)]
pub enum RuleSpec {
    /// A registry rule written as a token, e.g. `min:3` or `in:a,b,c`.
    Named {
        name: String,
        /// Text after the first `:`, not yet split into parameters.
        args: Option<String>,
    },
    /// An opaque predicate object.
    Custom(Arc<dyn Predicate>),
}

impl RuleSpec {
    /// Splits a token at its first `:`.
    pub fn token(token: &str) -> RuleSpec {
        let token = token.trim();
        match token.split_once(':') {
            Some((name, args)) => RuleSpec::Named {
                name: name.trim().to_string(),
                args: Some(args.to_string()),
            },
            None => RuleSpec::Named {
                name: token.to_string(),
                args: None,
            },
        }
    }

    pub fn custom(predicate: impl Predicate + 'static) -> RuleSpec {
        RuleSpec::Custom(Arc::new(predicate))
    }

    pub fn name(&self) -> &str {
        match self {
            RuleSpec::Named { name, .. } => name,
            RuleSpec::Custom(p) => p.name(),
        }
    }
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSpec::Named {
                name,
                args: Some(args),
            } => write!(f, "{}:{}", name, args),
            RuleSpec::Named { name, args: None } => f.write_str(name),
            RuleSpec::Custom(p) => write!(f, "{:?}", p),
        }
    }
}

impl From<&str> for RuleSpec {
    fn from(token: &str) -> Self {
        RuleSpec::token(token)
    }
}

impl From<Password> for RuleSpec {
    fn from(p: Password) -> Self {
        RuleSpec::custom(p)
    }
}

impl From<RuleIn> for RuleSpec {
    fn from(p: RuleIn) -> Self {
        RuleSpec::custom(p)
    }
}

// ─── RuleList ───────────────────────────────────────────────────────────────

/// Anything that can be attached to a path with [`RuleSchema::field`].
#[derive(Clone, Debug, Default)]
pub struct RuleList(pub Vec<RuleSpec>);

impl RuleList {
    /// Parses a pipe-delimited rule string. Empty tokens are ignored.
    ///
    /// Patterns containing `|` must use the list form instead.
    pub fn parse(rules: &str) -> RuleList {
        RuleList(
            rules
                .split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(RuleSpec::token)
                .collect(),
        )
    }
}

impl From<&str> for RuleList {
    fn from(rules: &str) -> Self {
        RuleList::parse(rules)
    }
}

impl From<Vec<RuleSpec>> for RuleList {
    fn from(specs: Vec<RuleSpec>) -> Self {
        RuleList(specs)
    }
}

impl From<Vec<&str>> for RuleList {
    fn from(tokens: Vec<&str>) -> Self {
        RuleList(tokens.into_iter().map(RuleSpec::token).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RuleList {
    fn from(tokens: [&str; N]) -> Self {
        RuleList(tokens.into_iter().map(RuleSpec::token).collect())
    }
}

impl From<RuleSpec> for RuleList {
    fn from(spec: RuleSpec) -> Self {
        RuleList(vec![spec])
    }
}

// ─── RuleSchema ─────────────────────────────────────────────────────────────

/// Declarative mapping of paths to ordered rule lists, plus message overrides.
#[derive(Clone, Debug, Default)]
pub struct RuleSchema {
    entries: Vec<(String, Vec<RuleSpec>)>,
    messages: Messages,
}

impl RuleSchema {
    pub fn new() -> Self {
        RuleSchema::default()
    }

    /// Attaches `rules` to `path`. A path given twice accumulates its rules in
    /// order.
    pub fn field(mut self, path: &str, rules: impl Into<RuleList>) -> Self {
        self.add(path, rules);
        self
    }

    pub fn add(&mut self, path: &str, rules: impl Into<RuleList>) {
        let RuleList(specs) = rules.into();
        match self.entries.iter_mut().find(|(p, _)| p == path) {
            Some((_, existing)) => existing.extend(specs),
            None => self.entries.push((path.to_string(), specs)),
        }
    }

    /// Mounts `sub` under `prefix`, joining paths with `.`.
    pub fn nested(mut self, prefix: &str, sub: RuleSchema) -> Self {
        for (path, specs) in sub.entries {
            self.add(&join(prefix, &path), specs);
        }
        self.messages.extend(sub.messages);
        self
    }

    /// Adds a custom message template (see [`Messages`] for key lookup).
    pub fn message(mut self, key: &str, template: &str) -> Self {
        self.messages.insert(key, template);
        self
    }

    /// Sets the display name used for `:attribute` at `path`.
    pub fn attribute(mut self, path: &str, name: &str) -> Self {
        self.messages.insert_attribute(path, name);
        self
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[RuleSpec])> {
        self.entries.iter().map(|(p, s)| (p.as_str(), s.as_slice()))
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a schema from a JSON-shaped description.
    ///
    /// Each key maps to a pipe-delimited string, a list of token strings, or
    /// a nested mapping whose keys are joined below the parent key.
    pub fn from_value(value: &Value) -> Result<RuleSchema, SchemaError> {
        let mut schema = RuleSchema::new();
        match value {
            Value::Object(_) => collect(&mut schema, "", value)?,
            Value::Null => {}
            other => {
                return Err(SchemaError::Shape(format!(
                    "schema root must be a mapping, got {}",
                    json_kind(other)
                )));
            }
        }
        Ok(schema)
    }

    /// Parses the [`from_value`](RuleSchema::from_value) shape from YAML.
    pub fn from_yaml(input: &str) -> Result<RuleSchema, LoadError> {
        crate::load::parse_schema(input)
    }
}

fn collect(schema: &mut RuleSchema, prefix: &str, value: &Value) -> Result<(), SchemaError> {
    let Some(map) = value.as_object() else {
        return Ok(());
    };
    for (key, rules) in map {
        let path = join(prefix, key);
        match rules {
            Value::String(s) => schema.add(&path, RuleList::parse(s)),
            Value::Array(items) => {
                let mut specs = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(token) => specs.push(RuleSpec::token(token)),
                        other => {
                            return Err(SchemaError::Shape(format!(
                                "rule tokens at '{}' must be strings, got {}",
                                path,
                                json_kind(other)
                            )));
                        }
                    }
                }
                schema.add(&path, specs);
            }
            Value::Object(_) => collect(schema, &path, rules)?,
            other => {
                return Err(SchemaError::Shape(format!(
                    "rules at '{}' must be a string, list, or mapping, got {}",
                    path,
                    json_kind(other)
                )));
            }
        }
    }
    Ok(())
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
