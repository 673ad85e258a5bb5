//! Built-in named rules and the [`Predicate`] extension point.
//!
//! Named rules live in a compile-time registry. Each entry declares its
//! class, the shape of its parameters, and a pure check over the value at
//! the rule's path and the whole snapshot.

use crate::accessor;
use crate::enums::{ParamKind, RuleClass};
use crate::node::Node;
use crate::path::{Path, Segment};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

// ─── Predicate trait ────────────────────────────────────────────────────────

/// Extension point for rules that need non-string parameters or composite
/// policies.
///
/// Implementations carry their own parameters. They are evaluated through the
/// same pass as named rules and must be pure.
pub trait Predicate: fmt::Debug + Send + Sync {
    /// Name reported in failures and used for message overrides.
    fn name(&self) -> &str;

    /// Returns `true` when `value` passes. `value` is `None` when the path is
    /// absent from the snapshot.
    fn evaluate(&self, value: Option<&Node>, cx: &PredicateContext<'_>) -> bool;

    /// Message template; may use `:attribute` and the names from [`params`].
    ///
    /// [`params`]: Predicate::params
    fn message(&self) -> String;

    /// Placeholder substitutions for [`message`](Predicate::message).
    fn params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Implicit predicates run even when the value is absent or blank.
    fn implicit(&self) -> bool {
        false
    }

    /// Other paths this predicate reads. Wildcards bind to the owning path's
    /// indices, and a write at or below any of them re-runs the predicate in
    /// change mode.
    fn references(&self) -> Vec<Path> {
        Vec::new()
    }
}

/// Where a [`Predicate`] is being evaluated.
#[derive(Clone, Copy, Debug)]
pub struct PredicateContext<'a> {
    /// The concrete path of the value under test.
    pub path: &'a Path,
    /// Indices taken by the schema path's wildcards, outermost first.
    pub indices: &'a [usize],
    pub data: &'a Node,
}

impl<'a> PredicateContext<'a> {
    pub fn new(path: &'a Path, indices: &'a [usize], data: &'a Node) -> Self {
        PredicateContext {
            path,
            indices,
            data,
        }
    }

    /// Looks up `reference` in the snapshot after binding its wildcards to
    /// this context's indices.
    pub fn resolve(&self, reference: &Path) -> Option<&'a Node> {
        let concrete = reference.bind(self.indices)?;
        accessor::get(self.data, &concrete)
    }
}

// ─── Parameters ─────────────────────────────────────────────────────────────

/// A compiled rule parameter.
#[derive(Clone, Debug)]
pub enum Param {
    Text(String),
    Number(f64),
    Path(Path),
    Pattern(Regex),
}

impl Param {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Param::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Param::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Text(s) => f.write_str(s),
            Param::Number(n) => write!(f, "{}", n),
            Param::Path(p) => write!(f, "{}", p),
            Param::Pattern(re) => f.write_str(re.as_str()),
        }
    }
}

/// Everything a named rule check may look at.
pub struct Check<'a> {
    pub path: &'a Path,
    pub value: Option<&'a Node>,
    pub data: &'a Node,
    pub params: &'a [Param],
    /// The path also carries `numeric` or `integer`.
    pub numeric: bool,
}

// ─── Registry ───────────────────────────────────────────────────────────────

/// A registry entry for a named rule.
pub struct RuleDef {
    pub name: &'static str,
    pub class: RuleClass,
    /// Parameter kinds in order.
    pub params: &'static [ParamKind],
    /// The last kind repeats; at least `params.len()` arguments are required.
    pub variadic: bool,
    /// The argument text is taken whole instead of being split on commas.
    pub raw: bool,
    /// Placeholder names for messages, aligned with `params`. With `variadic`
    /// the last name receives the remaining arguments joined by `, `.
    pub placeholders: &'static [&'static str],
    /// Marks the path numeric for size comparisons.
    pub numeric: bool,
    pub check: fn(&Check<'_>) -> bool,
}

impl fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDef")
            .field("name", &self.name)
            .field("class", &self.class)
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .finish_non_exhaustive()
    }
}

impl RuleDef {
    const fn new(name: &'static str, class: RuleClass, check: fn(&Check<'_>) -> bool) -> Self {
        RuleDef {
            name,
            class,
            params: &[],
            variadic: false,
            raw: false,
            placeholders: &[],
            numeric: false,
            check,
        }
    }

    const fn params(
        mut self,
        params: &'static [ParamKind],
        placeholders: &'static [&'static str],
    ) -> Self {
        self.params = params;
        self.placeholders = placeholders;
        self
    }

    const fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    const fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    const fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn is_flag(&self) -> bool {
        self.class == RuleClass::Flag
    }

    pub fn is_implicit(&self) -> bool {
        self.class == RuleClass::Implicit
    }

    /// Whether `count` arguments satisfy this rule's arity.
    pub fn accepts(&self, count: usize) -> bool {
        if self.variadic {
            count >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    /// Human-readable arity for error messages.
    pub fn arity(&self) -> String {
        if self.variadic {
            format!("at least {}", self.params.len())
        } else {
            self.params.len().to_string()
        }
    }

    /// Kind of the `i`-th argument.
    pub fn kind_at(&self, i: usize) -> ParamKind {
        match self.params.get(i).or(self.params.last()) {
            Some(kind) => *kind,
            None => ParamKind::Text,
        }
    }
}

use ParamKind::{Number as N, Path as P, Pattern as R, Text as T};
use RuleClass::{Flag, Implicit, Regular};

/// Every named rule the engine understands.
pub static RULE_REGISTRY: &[RuleDef] = &[
    // Flags
    RuleDef::new("bail", Flag, always),
    RuleDef::new("nullable", Flag, always),
    RuleDef::new("sometimes", Flag, always),
    // Required family
    RuleDef::new("required", Implicit, required),
    RuleDef::new("required_if", Implicit, required_if)
        .params(&[P, T], &["other", "value"])
        .variadic(),
    RuleDef::new("required_unless", Implicit, required_unless)
        .params(&[P, T], &["other", "values"])
        .variadic(),
    RuleDef::new("required_with", Implicit, required_with)
        .params(&[P], &["values"])
        .variadic(),
    RuleDef::new("required_with_all", Implicit, required_with_all)
        .params(&[P], &["values"])
        .variadic(),
    RuleDef::new("required_without", Implicit, required_without)
        .params(&[P], &["values"])
        .variadic(),
    RuleDef::new("accepted", Implicit, accepted),
    // Types
    RuleDef::new("string", Regular, is_string),
    RuleDef::new("integer", Regular, is_integer).numeric(),
    RuleDef::new("numeric", Regular, is_numeric).numeric(),
    RuleDef::new("boolean", Regular, is_boolean),
    RuleDef::new("array", Regular, |c| c.value.is_some_and(|v| v.as_array().is_some())),
    RuleDef::new("object", Regular, |c| c.value.is_some_and(|v| v.as_object().is_some())),
    // Formats
    RuleDef::new("email", Regular, |c| text_matches(c.value, &EMAIL_RE)),
    RuleDef::new("alpha", Regular, |c| text_matches(c.value, &ALPHA_RE)),
    RuleDef::new("alpha_num", Regular, |c| text_matches(c.value, &ALPHA_NUM_RE)),
    RuleDef::new("alpha_dash", Regular, |c| text_matches(c.value, &ALPHA_DASH_RE)),
    RuleDef::new("digits", Regular, digits).params(&[N], &["digits"]),
    RuleDef::new("regex", Regular, regex_match).params(&[R], &[]).raw(),
    // Sizes
    RuleDef::new("min", Regular, |c| size_cmp(c, |s, n| s >= n[0])).params(&[N], &["min"]),
    RuleDef::new("max", Regular, |c| size_cmp(c, |s, n| s <= n[0])).params(&[N], &["max"]),
    RuleDef::new("between", Regular, |c| size_cmp(c, |s, n| n[0] <= s && s <= n[1]))
        .params(&[N, N], &["min", "max"]),
    RuleDef::new("size", Regular, |c| size_cmp(c, |s, n| s == n[0])).params(&[N], &["size"]),
    // Membership and comparison
    RuleDef::new("in", Regular, |c| membership(c, true))
        .params(&[T], &["values"])
        .variadic(),
    RuleDef::new("not_in", Regular, |c| membership(c, false))
        .params(&[T], &["values"])
        .variadic(),
    RuleDef::new("same", Regular, same).params(&[P], &["other"]),
    RuleDef::new("different", Regular, different).params(&[P], &["other"]),
    RuleDef::new("confirmed", Regular, confirmed),
];

/// Looks up a named rule.
pub fn lookup_rule(name: &str) -> Option<&'static RuleDef> {
    RULE_REGISTRY.iter().find(|def| def.name == name)
}

// ─── Cached regexes ─────────────────────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static ALPHA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}]+$").unwrap());

static ALPHA_NUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}\p{N}]+$").unwrap());

static ALPHA_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}\p{N}_-]+$").unwrap());

static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$").unwrap()
});

// ─── Shared helpers ─────────────────────────────────────────────────────────

/// Presence as the required family sees it: not absent, not null, not a
/// blank string, not an empty container.
pub fn is_present(value: Option<&Node>) -> bool {
    match value {
        None | Some(Node::Null) => false,
        Some(Node::String(s)) => !s.trim().is_empty(),
        Some(Node::Array(items)) => !items.is_empty(),
        Some(Node::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

/// Absent or a blank string. Regular rules are skipped for such values.
pub fn is_blank(value: Option<&Node>) -> bool {
    match value {
        None => true,
        Some(Node::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Numeric reading of a value: numbers, and strings in numeric form.
pub fn numeric_value(value: &Node) -> Option<f64> {
    match value {
        Node::Number(n) => n.as_f64(),
        Node::String(s) if NUMERIC_RE.is_match(s.trim()) => s.trim().parse().ok(),
        _ => None,
    }
}

/// What size rules compare against.
pub fn size_of(value: &Node, numeric: bool) -> Option<f64> {
    if numeric && let Some(n) = numeric_value(value) {
        return Some(n);
    }
    match value {
        Node::String(s) => Some(s.chars().count() as f64),
        Node::Array(items) => Some(items.len() as f64),
        Node::Object(map) => Some(map.len() as f64),
        Node::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn other_values<'a>(c: &Check<'a>) -> impl Iterator<Item = Option<&'a Node>> {
    let data = c.data;
    c.params
        .iter()
        .filter_map(Param::as_path)
        .map(move |p| accessor::get(data, p))
}

fn text_matches(value: Option<&Node>, re: &Regex) -> bool {
    value.and_then(Node::as_str).is_some_and(|s| re.is_match(s))
}

fn scalar_in(value: &Node, candidates: &[Param]) -> bool {
    value
        .scalar_text()
        .is_some_and(|text| candidates.iter().any(|p| p.to_string() == text))
}

// ─── Checks ─────────────────────────────────────────────────────────────────

fn always(_: &Check<'_>) -> bool {
    true
}

fn required(c: &Check<'_>) -> bool {
    is_present(c.value)
}

fn required_if(c: &Check<'_>) -> bool {
    let Some(other) = c.params.first().and_then(Param::as_path) else {
        return true;
    };
    let values = c.params.get(1..).unwrap_or_default();
    let triggered = accessor::get(c.data, other).is_some_and(|v| scalar_in(v, values));
    !triggered || is_present(c.value)
}

fn required_unless(c: &Check<'_>) -> bool {
    let Some(other) = c.params.first().and_then(Param::as_path) else {
        return true;
    };
    let values = c.params.get(1..).unwrap_or_default();
    let exempt = accessor::get(c.data, other).is_some_and(|v| scalar_in(v, values));
    exempt || is_present(c.value)
}

fn required_with(c: &Check<'_>) -> bool {
    let any_present = other_values(c).any(is_present);
    !any_present || is_present(c.value)
}

fn required_with_all(c: &Check<'_>) -> bool {
    let all_present = other_values(c).all(is_present);
    !all_present || is_present(c.value)
}

fn required_without(c: &Check<'_>) -> bool {
    let any_missing = other_values(c).any(|v| !is_present(v));
    !any_missing || is_present(c.value)
}

fn accepted(c: &Check<'_>) -> bool {
    match c.value {
        Some(Node::Bool(b)) => *b,
        Some(Node::Number(n)) => n.as_f64() == Some(1.0),
        Some(Node::String(s)) => matches!(&**s, "yes" | "on" | "1" | "true"),
        _ => false,
    }
}

fn is_string(c: &Check<'_>) -> bool {
    c.value.is_some_and(|v| v.as_str().is_some())
}

fn is_integer(c: &Check<'_>) -> bool {
    match c.value {
        Some(Node::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        Some(Node::String(s)) => INTEGER_RE.is_match(s.trim()),
        _ => false,
    }
}

fn is_numeric(c: &Check<'_>) -> bool {
    c.value.and_then(numeric_value).is_some()
}

fn is_boolean(c: &Check<'_>) -> bool {
    match c.value {
        Some(Node::Bool(_)) => true,
        Some(Node::Number(n)) => matches!(n.as_f64(), Some(f) if f == 0.0 || f == 1.0),
        Some(Node::String(s)) => matches!(&**s, "0" | "1" | "true" | "false"),
        _ => false,
    }
}

fn digits(c: &Check<'_>) -> bool {
    let Some(want) = c.params.first().and_then(Param::as_f64) else {
        return false;
    };
    let text = match c.value {
        Some(Node::String(s)) => s.to_string(),
        Some(Node::Number(n)) if n.is_u64() => n.to_string(),
        _ => return false,
    };
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) && text.len() as f64 == want
}

fn regex_match(c: &Check<'_>) -> bool {
    match c.params.first() {
        Some(Param::Pattern(re)) => c
            .value
            .and_then(Node::scalar_text)
            .is_some_and(|text| re.is_match(&text)),
        _ => false,
    }
}

fn size_cmp(c: &Check<'_>, cmp: fn(f64, &[f64]) -> bool) -> bool {
    let bounds: Vec<f64> = c.params.iter().filter_map(Param::as_f64).collect();
    c.value
        .and_then(|v| size_of(v, c.numeric))
        .is_some_and(|size| cmp(size, &bounds))
}

fn membership(c: &Check<'_>, want: bool) -> bool {
    match c.value {
        Some(Node::Array(items)) => items.iter().all(|item| scalar_in(item, c.params) == want),
        Some(v) => scalar_in(v, c.params) == want,
        None => !want,
    }
}

fn same(c: &Check<'_>) -> bool {
    let other = c
        .params
        .first()
        .and_then(Param::as_path)
        .and_then(|p| accessor::get(c.data, p));
    match (c.value, other) {
        (Some(a), Some(b)) => a.loosely_equals(b),
        _ => false,
    }
}

fn different(c: &Check<'_>) -> bool {
    let other = c
        .params
        .first()
        .and_then(Param::as_path)
        .and_then(|p| accessor::get(c.data, p));
    match (c.value, other) {
        (Some(a), Some(b)) => !a.loosely_equals(b),
        _ => true,
    }
}

fn confirmed(c: &Check<'_>) -> bool {
    let Some(twin) = confirmation_path(c.path) else {
        return false;
    };
    match (c.value, accessor::get(c.data, &twin)) {
        (Some(a), Some(b)) => a.loosely_equals(b),
        _ => false,
    }
}

/// The sibling `<last>_confirmation` that `confirmed` compares against.
pub fn confirmation_path(path: &Path) -> Option<Path> {
    let last = path.last()?;
    let parent = path.prefix(path.len() - 1);
    Some(parent.child(Segment::Field(format!("{}_confirmation", last))))
}
