//! Persistent snapshot tree.
//!
//! A [`Node`] has the shape of a JSON value, but sequences and mappings sit
//! behind reference counts. Cloning a node is cheap, and a path write (see
//! [`accessor`](crate::accessor)) copies only the containers along the
//! written path while every untouched subtree stays shared with the previous
//! snapshot.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Field-keyed mapping of a [`Node::Object`].
pub type Map = BTreeMap<String, Node>;

/// One immutable form-data tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    Array(Arc<Vec<Node>>),
    Object(Arc<Map>),
}

impl Node {
    pub fn array(items: Vec<Node>) -> Node {
        Node::Array(Arc::new(items))
    }

    pub fn object(map: Map) -> Node {
        Node::Object(Arc::new(map))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Node::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Short type name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "sequence",
            Node::Object(_) => "mapping",
        }
    }

    /// Scalars rendered as text: strings as-is, numbers and bools in their
    /// JSON form. Null and containers have no scalar rendering.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Node::String(s) => Some(s.to_string()),
            Node::Number(n) => Some(n.to_string()),
            Node::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Loose equality: numbers compare by value, so `42` equals `42.0`.
    pub fn loosely_equals(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Number(a), Node::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(fa), Some(fb)) => fa == fb,
                _ => a == b,
            },
            (Node::Array(a), Node::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loosely_equals(y))
            }
            (Node::Object(a), Node::Object(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.get(k).is_some_and(|bv| v.loosely_equals(bv)))
            }
            _ => self == other,
        }
    }

    /// True when both nodes are the same shared container allocation.
    pub fn shares_with(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Array(a), Node::Array(b)) => Arc::ptr_eq(a, b),
            (Node::Object(a), Node::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::from(self)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s.into()),
            Value::Array(items) => Node::array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.to_string()),
            Node::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::from(&node)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.into())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s.into())
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Node::Number(n.into())
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        Node::Number(n.into())
    }
}

/// Non-finite floats become null, as in JSON.
impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Node::Number).unwrap_or(Node::Null)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::array(items)
    }
}

impl From<Map> for Node {
    fn from(map: Map) -> Self {
        Node::object(map)
    }
}
