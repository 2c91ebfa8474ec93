//! Runtime value representation
//!
//! Two families of values live here:
//!
//! - [`Value`]: the live, tagged value manipulated by the executors. Lists and
//!   dictionaries are shared cells, so every alias observes a mutation.
//! - [`FrozenValue`]: an owned deep copy taken when a frame is recorded. It has
//!   no interior mutability, so nothing that happens after the frame was built
//!   can reach it.
//!
//! Front-ends never look at host primitives directly; every operand carries its
//! tag and the language decides which combinations it accepts.

use serde_json::json;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Insertion-ordered dictionary entries.
pub type DictEntries = Vec<(String, Value)>;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<DictEntries>>),
    #[default]
    None,
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn dict(entries: DictEntries) -> Self {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    /// Type tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
            Value::None => "null",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Host-language truthiness, only consulted when a language allows it.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::List(_) | Value::Dict(_) => true,
            Value::None => false,
        }
    }

    /// Recursively copy this value into a fresh, unshared tree.
    ///
    /// Used for pass-by-value argument semantics; the result shares no cells
    /// with `self`.
    pub fn deep_clone(&self) -> Value {
        match self {
            Value::List(items) => {
                Value::list(items.borrow().iter().map(Value::deep_clone).collect())
            }
            Value::Dict(entries) => Value::dict(
                entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.deep_clone()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Take an immutable snapshot of this value and everything it reaches.
    pub fn freeze(&self) -> FrozenValue {
        match self {
            Value::Number(n) => FrozenValue::Number(*n),
            Value::String(s) => FrozenValue::String(s.clone()),
            Value::Boolean(b) => FrozenValue::Boolean(*b),
            Value::List(items) => {
                FrozenValue::List(items.borrow().iter().map(Value::freeze).collect())
            }
            Value::Dict(entries) => FrozenValue::Dict(
                entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.freeze()))
                    .collect(),
            ),
            Value::None => FrozenValue::None,
        }
    }

    /// Wrap a host value by its native shape.
    ///
    /// Numbers, strings and booleans wrap directly, arrays wrap element-wise
    /// into lists, objects into dictionaries and `null` into none.
    pub fn from_json(value: &serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::list(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::dict(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.freeze().to_json()
    }

    /// Text written by `log` / `console.log`: strings are printed bare.
    pub fn to_output_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.freeze())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Immutable deep copy of a [`Value`], owned by a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrozenValue {
    Number(f64),
    String(String),
    Boolean(bool),
    List(Vec<FrozenValue>),
    Dict(Vec<(String, FrozenValue)>),
    None,
}

impl FrozenValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FrozenValue::Number(_) => "number",
            FrozenValue::String(_) => "string",
            FrozenValue::Boolean(_) => "boolean",
            FrozenValue::List(_) => "list",
            FrozenValue::Dict(_) => "dictionary",
            FrozenValue::None => "null",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FrozenValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrozenValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a dictionary entry by key.
    pub fn get(&self, key: &str) -> Option<&FrozenValue> {
        match self {
            FrozenValue::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Rebuild a live value from this snapshot. The result shares nothing
    /// with the frame it came from.
    pub fn thaw(&self) -> Value {
        match self {
            FrozenValue::Number(n) => Value::Number(*n),
            FrozenValue::String(s) => Value::String(s.clone()),
            FrozenValue::Boolean(b) => Value::Boolean(*b),
            FrozenValue::List(items) => Value::list(items.iter().map(FrozenValue::thaw).collect()),
            FrozenValue::Dict(entries) => Value::dict(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.thaw()))
                    .collect(),
            ),
            FrozenValue::None => Value::None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FrozenValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    json!(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            FrozenValue::String(s) => json!(s),
            FrozenValue::Boolean(b) => json!(b),
            FrozenValue::List(items) => {
                serde_json::Value::Array(items.iter().map(FrozenValue::to_json).collect())
            }
            FrozenValue::Dict(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            FrozenValue::None => serde_json::Value::Null,
        }
    }

    /// Compare against a host value by shape, the way IO scenarios check
    /// a function's return value.
    pub fn matches_json(&self, expected: &serde_json::Value) -> bool {
        match (self, expected) {
            (FrozenValue::Number(a), serde_json::Value::Number(b)) => {
                b.as_f64().is_some_and(|b| *a == b)
            }
            (FrozenValue::String(a), serde_json::Value::String(b)) => a == b,
            (FrozenValue::Boolean(a), serde_json::Value::Bool(b)) => a == b,
            (FrozenValue::None, serde_json::Value::Null) => true,
            (FrozenValue::List(a), serde_json::Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches_json(y))
            }
            (FrozenValue::Dict(a), serde_json::Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.matches_json(other)))
            }
            _ => false,
        }
    }
}

/// Format a number the way learners expect to read it: integral values
/// without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for FrozenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrozenValue::Number(n) => write!(f, "{}", format_number(*n)),
            FrozenValue::String(s) => write!(f, "\"{}\"", s),
            FrozenValue::Boolean(b) => write!(f, "{}", b),
            FrozenValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FrozenValue::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", k, v)?;
                }
                write!(f, "}}")
            }
            FrozenValue::None => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_is_detached_from_later_mutation() {
        let inner = Value::list(vec![Value::Number(1.0)]);
        let outer = Value::list(vec![inner.clone()]);
        let frozen = outer.freeze();

        if let Value::List(cells) = &inner {
            cells.borrow_mut().push(Value::Number(2.0));
        }

        assert_eq!(frozen.to_string(), "[[1]]");
        assert_eq!(outer.to_string(), "[[1, 2]]");
    }

    #[test]
    fn deep_clone_shares_no_cells() {
        let original = Value::dict(vec![("a".into(), Value::list(vec![Value::Number(1.0)]))]);
        let copy = original.deep_clone();

        if let Value::Dict(entries) = &copy {
            entries.borrow_mut()[0].1 = Value::Number(9.0);
        }

        assert_eq!(original.to_string(), "{\"a\": [1]}");
        assert_eq!(copy.to_string(), "{\"a\": 9}");
    }

    #[test]
    fn json_wraps_by_shape() {
        let value = Value::from_json(&json!([1, "two", true, null, {"k": 2.5}]));
        assert_eq!(value.type_name(), "list");
        assert_eq!(value.to_string(), "[1, \"two\", true, null, {\"k\": 2.5}]");
        assert!(value.freeze().matches_json(&json!([1, "two", true, null, {"k": 2.5}])));
    }

    #[test]
    fn numbers_print_without_trailing_zero() {
        assert_eq!(format_number(6.0), "6");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
    }
}
