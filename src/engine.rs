//! Schema expansion and rule evaluation.
//!
//! ```text
//! expand(schema, data) → ResolvedRuleSet → evaluate(set, data) → Vec<Failure>
//! ```
//!
//! Expansion compiles every rule before looking at the data, so a broken
//! schema fails the same way whether or not its wildcards match anything.

use crate::accessor;
use crate::enums::{ParamKind, SizeKind};
use crate::error::SchemaError;
use crate::messages::{self, FALLBACK_TEMPLATE, Messages};
use crate::node::Node;
use crate::path::{Path, Segment};
use crate::rules::{self, Check, Param, Predicate, PredicateContext, RuleDef};
use crate::schema::{RuleSchema, RuleSpec};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ─── Types ──────────────────────────────────────────────────────────────────

/// One failed rule at one concrete path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub path: Path,
    pub rule: String,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.rule, self.path, self.message)
    }
}

/// A compiled rule, ready to run against one concrete path.
#[derive(Clone)]
pub enum ResolvedRule {
    Named {
        def: &'static RuleDef,
        params: Vec<Param>,
    },
    Custom {
        predicate: Arc<dyn Predicate>,
        /// Indices the owning path's wildcards took.
        indices: Vec<usize>,
    },
}

impl ResolvedRule {
    pub fn name(&self) -> &str {
        match self {
            ResolvedRule::Named { def, .. } => def.name,
            ResolvedRule::Custom { predicate, .. } => predicate.name(),
        }
    }

    fn named(&self) -> Option<&'static RuleDef> {
        match self {
            ResolvedRule::Named { def, .. } => Some(*def),
            ResolvedRule::Custom { .. } => None,
        }
    }

    fn is_flag(&self) -> bool {
        self.named().is_some_and(RuleDef::is_flag)
    }

    fn is_implicit(&self) -> bool {
        match self {
            ResolvedRule::Named { def, .. } => def.is_implicit(),
            ResolvedRule::Custom { predicate, .. } => predicate.implicit(),
        }
    }

    /// Parameters as they would appear in a token, for inspection and tests.
    pub fn params(&self) -> Vec<String> {
        match self {
            ResolvedRule::Named { params, .. } => params.iter().map(Param::to_string).collect(),
            ResolvedRule::Custom { predicate, .. } => {
                predicate.params().into_iter().map(|(_, v)| v).collect()
            }
        }
    }

    /// Concrete paths, other than `owner` itself, whose values this rule reads.
    pub fn references(&self, owner: &Path) -> Vec<Path> {
        match self {
            ResolvedRule::Named { def, params } => {
                let mut paths: Vec<Path> =
                    params.iter().filter_map(Param::as_path).cloned().collect();
                if def.name == "confirmed" {
                    paths.extend(rules::confirmation_path(owner));
                }
                paths
            }
            ResolvedRule::Custom { predicate, indices } => predicate
                .references()
                .iter()
                .filter_map(|reference| reference.bind(indices))
                .collect(),
        }
    }
}

impl fmt::Debug for ResolvedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedRule::Named { def, params } => f
                .debug_struct("Named")
                .field("rule", &def.name)
                .field("params", params)
                .finish(),
            ResolvedRule::Custom { predicate, indices } => f
                .debug_struct("Custom")
                .field("predicate", predicate)
                .field("indices", indices)
                .finish(),
        }
    }
}

/// The rules for one concrete path.
#[derive(Clone, Debug)]
pub struct ResolvedEntry {
    pub path: Path,
    /// The schema path this entry was expanded from.
    pub pattern: Path,
    pub rules: Vec<ResolvedRule>,
}

impl ResolvedEntry {
    /// True when a rule here reads a value at, above, or below `prefix`, so a
    /// write there can change its outcome.
    pub fn depends_on(&self, prefix: &Path) -> bool {
        self.rules.iter().any(|rule| {
            rule.references(&self.path)
                .iter()
                .any(|r| r.starts_with(prefix) || prefix.starts_with(r))
        })
    }
}

/// Wildcard-free rule set for one snapshot.
#[derive(Clone, Debug)]
pub struct ResolvedRuleSet<'s> {
    entries: Vec<ResolvedEntry>,
    messages: &'s Messages,
}

impl<'s> ResolvedRuleSet<'s> {
    pub fn entries(&self) -> &[ResolvedEntry] {
        &self.entries
    }

    pub fn get(&self, path: &Path) -> Option<&ResolvedEntry> {
        self.entries.iter().find(|e| &e.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| &e.path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keeps entries at or below `prefix`, plus entries elsewhere whose
    /// cross-field references overlap it.
    pub fn scoped(mut self, prefix: &Path) -> Self {
        self.entries
            .retain(|e| e.path.starts_with(prefix) || e.depends_on(prefix));
        self
    }
}

// ─── Compilation ────────────────────────────────────────────────────────────

struct CompiledEntry {
    pattern: Path,
    rules: Vec<ResolvedRule>,
}

fn compile(schema: &RuleSchema) -> Result<Vec<CompiledEntry>, SchemaError> {
    schema
        .entries()
        .map(|(path, specs)| -> Result<CompiledEntry, SchemaError> {
            let pattern = Path::parse(path)?;
            let rules = specs
                .iter()
                .map(|spec| compile_spec(&pattern, spec))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CompiledEntry { pattern, rules })
        })
        .collect()
}

fn compile_spec(pattern: &Path, spec: &RuleSpec) -> Result<ResolvedRule, SchemaError> {
    let (name, args) = match spec {
        RuleSpec::Custom(p) => {
            return Ok(ResolvedRule::Custom {
                predicate: Arc::clone(p),
                indices: Vec::new(),
            });
        }
        RuleSpec::Named { name, args } => (name, args),
    };

    let def = rules::lookup_rule(name).ok_or_else(|| SchemaError::UnknownRule {
        path: pattern.to_string(),
        rule: name.clone(),
    })?;

    let raw_args: Vec<&str> = match args.as_deref() {
        None => Vec::new(),
        Some(a) if def.raw => vec![a],
        Some(a) => a.split(',').map(str::trim).collect(),
    };

    if !def.accepts(raw_args.len()) {
        return Err(SchemaError::Arity {
            path: pattern.to_string(),
            rule: def.name.to_string(),
            expected: def.arity(),
            got: raw_args.len(),
        });
    }

    let params = raw_args
        .iter()
        .enumerate()
        .map(|(i, raw)| compile_param(pattern, def, def.kind_at(i), raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedRule::Named { def, params })
}

fn compile_param(
    pattern: &Path,
    def: &RuleDef,
    kind: ParamKind,
    raw: &str,
) -> Result<Param, SchemaError> {
    let invalid = |reason: String| SchemaError::InvalidParameter {
        path: pattern.to_string(),
        rule: def.name.to_string(),
        param: raw.to_string(),
        reason,
    };

    match kind {
        ParamKind::Text => Ok(Param::Text(raw.to_string())),
        ParamKind::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Param::Number)
            .ok_or_else(|| invalid("expected a number".to_string())),
        ParamKind::Pattern => Regex::new(strip_delimiters(raw))
            .map(Param::Pattern)
            .map_err(|e| invalid(e.to_string())),
        ParamKind::Path => {
            if raw.trim().is_empty() {
                return Err(invalid("empty path reference".to_string()));
            }
            let reference = Path::parse(raw).map_err(|e| invalid(e.reason))?;
            if reference.wildcard_count() > pattern.wildcard_count() {
                return Err(SchemaError::WildcardMismatch {
                    path: pattern.to_string(),
                    rule: def.name.to_string(),
                    reference: raw.to_string(),
                });
            }
            Ok(Param::Path(reference))
        }
    }
}

/// Accepts `/pattern/` as well as a bare pattern.
fn strip_delimiters(raw: &str) -> &str {
    raw.strip_prefix('/')
        .and_then(|r| r.strip_suffix('/'))
        .filter(|r| !r.is_empty())
        .unwrap_or(raw)
}

// ─── Expansion ──────────────────────────────────────────────────────────────

/// Expands `schema` against the current shape of `data`.
///
/// Each wildcard yields one entry per element of the sequence at its concrete
/// prefix; a missing, non-sequence, or empty sequence yields none. Wildcards
/// in cross-field references take the owning path's indices in order.
pub fn expand<'s>(schema: &'s RuleSchema, data: &Node) -> Result<ResolvedRuleSet<'s>, SchemaError> {
    let compiled = compile(schema)?;

    let mut entries: Vec<ResolvedEntry> = Vec::new();
    let mut slots: HashMap<Path, usize> = HashMap::new();

    for entry in &compiled {
        let bindings = bind_wildcards(&entry.pattern, data);
        tracing::trace!(
            pattern = %entry.pattern,
            concrete = bindings.len(),
            "expanded schema path"
        );
        for (path, indices) in bindings {
            let rules = entry
                .rules
                .iter()
                .map(|rule| bind_rule(rule, &entry.pattern, &indices))
                .collect::<Result<Vec<_>, _>>()?;
            match slots.get(&path) {
                Some(&i) => entries[i].rules.extend(rules),
                None => {
                    slots.insert(path.clone(), entries.len());
                    entries.push(ResolvedEntry {
                        path,
                        pattern: entry.pattern.clone(),
                        rules,
                    });
                }
            }
        }
    }

    Ok(ResolvedRuleSet {
        entries,
        messages: schema.messages(),
    })
}

/// Concrete paths for `pattern`, each with the indices its wildcards took.
fn bind_wildcards(pattern: &Path, data: &Node) -> Vec<(Path, Vec<usize>)> {
    let mut partial = vec![(Path::root(), Vec::new())];
    for seg in pattern.segments() {
        partial = match seg {
            Segment::Wildcard => partial
                .into_iter()
                .flat_map(|(prefix, bound)| {
                    let len = accessor::get(data, &prefix)
                        .and_then(Node::as_array)
                        .map_or(0, <[Node]>::len);
                    (0..len).map(move |i| {
                        let mut indices = bound.clone();
                        indices.push(i);
                        (prefix.index(i), indices)
                    })
                })
                .collect(),
            other => partial
                .into_iter()
                .map(|(prefix, bound)| (prefix.child(other.clone()), bound))
                .collect(),
        };
    }
    partial
}

fn bind_rule(
    rule: &ResolvedRule,
    pattern: &Path,
    indices: &[usize],
) -> Result<ResolvedRule, SchemaError> {
    let (def, params) = match rule {
        ResolvedRule::Named { def, params } => (def, params),
        ResolvedRule::Custom { predicate, .. } => {
            return Ok(ResolvedRule::Custom {
                predicate: Arc::clone(predicate),
                indices: indices.to_vec(),
            });
        }
    };
    let params = params
        .iter()
        .map(|param| match param {
            Param::Path(reference) if !reference.is_concrete() => reference
                .bind(indices)
                .map(Param::Path)
                .ok_or_else(|| SchemaError::WildcardMismatch {
                    path: pattern.to_string(),
                    rule: def.name.to_string(),
                    reference: reference.to_string(),
                }),
            other => Ok(other.clone()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResolvedRule::Named { def: *def, params })
}

// ─── Evaluation ─────────────────────────────────────────────────────────────

/// Runs every resolved rule against `data` and returns all failures, grouped
/// by path in entry order and by rule order within a path.
pub fn evaluate(resolved: &ResolvedRuleSet<'_>, data: &Node) -> Vec<Failure> {
    let failures: Vec<Failure> = resolved
        .entries
        .iter()
        .flat_map(|entry| evaluate_entry(entry, data, resolved.messages))
        .collect();
    tracing::debug!(
        paths = resolved.entries.len(),
        failures = failures.len(),
        "evaluated rule set"
    );
    failures
}

/// Expands and evaluates in one step.
pub fn run(schema: &RuleSchema, data: &Node) -> Result<Vec<Failure>, SchemaError> {
    let resolved = expand(schema, data)?;
    Ok(evaluate(&resolved, data))
}

fn evaluate_entry(entry: &ResolvedEntry, data: &Node, messages: &Messages) -> Vec<Failure> {
    let has = |name: &str| entry.rules.iter().any(|r| r.is_flag() && r.name() == name);
    let bail = has("bail");
    let nullable = has("nullable");
    let sometimes = has("sometimes");
    let numeric = entry
        .rules
        .iter()
        .any(|r| r.named().is_some_and(|d| d.numeric));

    let value = accessor::get(data, &entry.path);
    if sometimes && value.is_none() {
        return Vec::new();
    }

    let mut failures = Vec::new();
    for rule in &entry.rules {
        if rule.is_flag() {
            continue;
        }
        if !rule.is_implicit() {
            if rules::is_blank(value) {
                continue;
            }
            if nullable && value.is_some_and(Node::is_null) {
                continue;
            }
        }

        let passed = match rule {
            ResolvedRule::Named { def, params } => (def.check)(&Check {
                path: &entry.path,
                value,
                data,
                params,
                numeric,
            }),
            ResolvedRule::Custom { predicate, indices } => {
                predicate.evaluate(value, &PredicateContext::new(&entry.path, indices, data))
            }
        };

        if !passed {
            failures.push(Failure {
                path: entry.path.clone(),
                rule: rule.name().to_string(),
                message: render_message(entry, rule, value, numeric, messages),
            });
            if bail {
                break;
            }
        }
    }
    failures
}

fn render_message(
    entry: &ResolvedEntry,
    rule: &ResolvedRule,
    value: Option<&Node>,
    numeric: bool,
    messages: &Messages,
) -> String {
    let size = match value {
        _ if numeric => SizeKind::Numeric,
        Some(Node::Array(_)) | Some(Node::Object(_)) => SizeKind::Array,
        Some(Node::Number(_)) => SizeKind::Numeric,
        _ => SizeKind::String,
    };

    let mut replacements = vec![(
        "attribute".to_string(),
        messages.attribute_name(&entry.pattern, &entry.path),
    )];

    let fallback = match rule {
        ResolvedRule::Named { def, params } => {
            replacements.extend(placeholder_values(def, params));
            messages::default_template(def.name, size)
                .unwrap_or(FALLBACK_TEMPLATE)
                .to_string()
        }
        ResolvedRule::Custom { predicate, .. } => {
            replacements.extend(predicate.params());
            predicate.message()
        }
    };

    let template = messages
        .template_for(&entry.pattern, &entry.path, rule.name())
        .map(str::to_string)
        .unwrap_or(fallback);
    messages::render(&template, &replacements)
}

fn placeholder_values(def: &RuleDef, params: &[Param]) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (i, name) in def.placeholders.iter().enumerate() {
        let last = i + 1 == def.placeholders.len();
        let text = if last && def.variadic {
            params
                .get(i..)
                .unwrap_or_default()
                .iter()
                .map(Param::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            match params.get(i) {
                Some(p) => p.to_string(),
                None => continue,
            }
        };
        out.push((name.to_string(), text));
    }
    out
}
