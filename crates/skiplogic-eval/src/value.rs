//! Runtime values and the loose coercion rules operators are defined by.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
/// Runtime value used by the evaluator.
///
/// Survey answers arrive as JSON, so the variants mirror JSON. A missing
/// answer and an explicit `null` are both `Null`.
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// `null`, `""` and `[]` are empty. `0`, `false` and objects are not.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Stricter emptiness for answers: also blank strings and `{}`.
    pub fn is_blank_answer(&self) -> bool {
        match self {
            Value::String(s) => s.trim().is_empty(),
            Value::Object(map) => map.is_empty(),
            other => other.is_empty(),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Numeric coercion; `None` where the loose conversion yields NaN.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(*n),
            Value::String(s) => parse_number(s),
            Value::Array(items) => match items.as_slice() {
                [] => Some(0.0),
                [single] => single.to_number(),
                _ => None,
            },
            Value::Object(_) => None,
        }
    }

    /// Arithmetic operand: anything non-numeric counts as 0.
    pub fn number_or_zero(&self) -> f64 {
        self.to_number().unwrap_or(0.0)
    }

    /// A number only when the value actually carries one (no null/blank -> 0).
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::Array(_) | Value::Object(_) => None,
            other => other.to_number(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// String form used by concatenation and string functions; `null` is `""`.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items.iter().map(Value::to_js_string).collect::<Vec<_>>().join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Applies one path segment: numeric segments index arrays, others read object keys.
    pub fn navigate(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Value::Object(map) => map.get(segment),
            _ => None,
        }
    }

    /// Loose equality: numeric strings equal numbers, booleans compare as 0/1.
    pub fn loose_eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Null, _) | (_, Null) => false,
            (Number(a), Number(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Bool(_), _) => Number(self.number_or_zero()).loose_eq(other),
            (_, Bool(_)) => self.loose_eq(&Number(other.number_or_zero())),
            (Number(n), String(s)) | (String(s), Number(n)) => parse_number(s) == Some(*n),
            (Array(_), Array(_)) | (Object(_), Object(_)) => self == other,
            (Array(_), Number(_) | String(_)) => String(self.to_js_string()).loose_eq(other),
            (Number(_) | String(_), Array(_)) => self.loose_eq(&String(other.to_js_string())),
            _ => false,
        }
    }

    /// Relational ordering. Two strings compare lexically, anything else
    /// numerically. `None` (every operator false) when either side is null
    /// or not numeric.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        let a = self.to_primitive()?;
        let b = other.to_primitive()?;
        if let (Value::String(x), Value::String(y)) = (&a, &b) {
            return Some(x.cmp(y));
        }
        a.to_number()?.partial_cmp(&b.to_number()?)
    }

    fn to_primitive(&self) -> Option<Value> {
        match self {
            Value::Null | Value::Object(_) => None,
            Value::Array(_) => Some(Value::String(self.to_js_string())),
            other => Some(other.clone()),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return Some(0.0);
    }
    // Rust accepts "inf"/"nan" spellings that are not numbers here.
    if t.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    t.parse::<f64>().ok()
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Number::from_f64(n).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => serde_json::Value::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => serde_json::Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}
