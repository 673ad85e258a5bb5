//! Predicate objects for rules whose parameters do not fit a token string.

use crate::node::Node;
use crate::rules::{Predicate, PredicateContext};

// ─── Membership ─────────────────────────────────────────────────────────────

/// Membership over arbitrary values, compared loosely (`1` equals `1.0`).
///
/// A sequence value passes when every element passes.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleIn {
    values: Vec<Node>,
    negate: bool,
}

/// The value must be one of `values`.
pub fn rule_in<I, V>(values: I) -> RuleIn
where
    I: IntoIterator<Item = V>,
    V: Into<Node>,
{
    RuleIn {
        values: values.into_iter().map(Into::into).collect(),
        negate: false,
    }
}

/// The value must not be one of `values`.
pub fn rule_not_in<I, V>(values: I) -> RuleIn
where
    I: IntoIterator<Item = V>,
    V: Into<Node>,
{
    RuleIn {
        values: values.into_iter().map(Into::into).collect(),
        negate: true,
    }
}

impl RuleIn {
    fn contains(&self, value: &Node) -> bool {
        self.values.iter().any(|v| v.loosely_equals(value))
    }
}

impl Predicate for RuleIn {
    fn name(&self) -> &str {
        if self.negate { "not_in" } else { "in" }
    }

    fn evaluate(&self, value: Option<&Node>, _cx: &PredicateContext<'_>) -> bool {
        let want = !self.negate;
        match value {
            Some(Node::Array(items)) => items.iter().all(|item| self.contains(item) == want),
            Some(v) => self.contains(v) == want,
            None => self.negate,
        }
    }

    fn message(&self) -> String {
        "The selected :attribute is invalid.".to_string()
    }

    fn params(&self) -> Vec<(String, String)> {
        let values = self
            .values
            .iter()
            .map(|v| v.scalar_text().unwrap_or_else(|| v.to_value().to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        vec![("values".to_string(), values)]
    }
}

// ─── Password policy ────────────────────────────────────────────────────────

/// Composite password policy.
///
/// ```rust
/// use formcheck::predicates::Password;
///
/// let policy = Password::min(10).mixed_case().numbers();
/// assert_eq!(policy.min_length(), 10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Password {
    min: usize,
    letters: bool,
    mixed_case: bool,
    numbers: bool,
    symbols: bool,
}

impl Default for Password {
    /// At least eight characters, nothing else.
    fn default() -> Self {
        Password::min(8)
    }
}

impl Password {
    pub fn min(min: usize) -> Self {
        Password {
            min,
            letters: false,
            mixed_case: false,
            numbers: false,
            symbols: false,
        }
    }

    /// Require at least one letter.
    pub fn letters(mut self) -> Self {
        self.letters = true;
        self
    }

    /// Require at least one uppercase and one lowercase letter.
    pub fn mixed_case(mut self) -> Self {
        self.mixed_case = true;
        self
    }

    /// Require at least one digit.
    pub fn numbers(mut self) -> Self {
        self.numbers = true;
        self
    }

    /// Require at least one symbol (anything not a letter, digit, or space).
    pub fn symbols(mut self) -> Self {
        self.symbols = true;
        self
    }

    pub fn min_length(&self) -> usize {
        self.min
    }

    fn passes(&self, text: &str) -> bool {
        if text.chars().count() < self.min {
            return false;
        }
        if self.letters && !text.chars().any(char::is_alphabetic) {
            return false;
        }
        if self.mixed_case
            && !(text.chars().any(char::is_uppercase) && text.chars().any(char::is_lowercase))
        {
            return false;
        }
        if self.numbers && !text.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        if self.symbols
            && !text
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
        {
            return false;
        }
        true
    }
}

impl Predicate for Password {
    fn name(&self) -> &str {
        "password"
    }

    fn evaluate(&self, value: Option<&Node>, _cx: &PredicateContext<'_>) -> bool {
        value.and_then(Node::as_str).is_some_and(|s| self.passes(s))
    }

    fn message(&self) -> String {
        let mut extra = Vec::new();
        if self.mixed_case {
            extra.push("one uppercase and one lowercase letter");
        } else if self.letters {
            extra.push("one letter");
        }
        if self.numbers {
            extra.push("one number");
        }
        if self.symbols {
            extra.push("one symbol");
        }
        let mut message = "The :attribute must be at least :min characters".to_string();
        if !extra.is_empty() {
            message.push_str(" and contain at least ");
            message.push_str(&extra.join(", "));
        }
        message.push('.');
        message
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![("min".to_string(), self.min.to_string())]
    }
}
