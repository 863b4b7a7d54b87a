//! Operator semantics over `Value`.

use crate::value::Value;
use skiplogic_ast::{BinaryOp, UnaryOp};
use std::cmp::Ordering;

pub fn apply_unary(op: UnaryOp, v: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Bool(!v.truthy()),
        UnaryOp::Negate => Value::Number(-v.number_or_zero()),
        UnaryOp::Empty => Value::Bool(v.is_empty()),
        UnaryOp::NotEmpty => Value::Bool(!v.is_empty()),
    }
}

/// Both operands are already evaluated; `and`/`or` do not short-circuit.
pub fn apply_binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    match op {
        BinaryOp::Or => Value::Bool(l.truthy() || r.truthy()),
        BinaryOp::And => Value::Bool(l.truthy() && r.truthy()),
        BinaryOp::Eq => Value::Bool(l.loose_eq(r)),
        BinaryOp::Ne => Value::Bool(!l.loose_eq(r)),
        BinaryOp::Lt => Value::Bool(l.compare(r) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(l.compare(r), Some(Ordering::Less | Ordering::Equal))),
        BinaryOp::Gt => Value::Bool(l.compare(r) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(l.compare(r), Some(Ordering::Greater | Ordering::Equal))),
        BinaryOp::Contains => Value::Bool(contains(l, r)),
        BinaryOp::NotContains => Value::Bool(!contains(l, r)),
        BinaryOp::AnyOf => Value::Bool(any_of(l, r)),
        BinaryOp::AllOf => Value::Bool(all_of(l, r)),
        BinaryOp::Add => add(l, r),
        BinaryOp::Sub => Value::Number(l.number_or_zero() - r.number_or_zero()),
        BinaryOp::Mul => Value::Number(l.number_or_zero() * r.number_or_zero()),
        BinaryOp::Div => {
            let d = r.number_or_zero();
            Value::Number(if d == 0.0 { 0.0 } else { l.number_or_zero() / d })
        }
        BinaryOp::Mod => {
            let d = r.number_or_zero();
            Value::Number(if d == 0.0 { 0.0 } else { l.number_or_zero() % d })
        }
        BinaryOp::Pow => Value::Number(l.number_or_zero().powf(r.number_or_zero())),
    }
}

fn add(l: &Value, r: &Value) -> Value {
    if matches!(l, Value::String(_)) || matches!(r, Value::String(_)) {
        let mut s = l.to_js_string();
        s.push_str(&r.to_js_string());
        return Value::String(s);
    }
    Value::Number(l.number_or_zero() + r.number_or_zero())
}

/// Array membership on the raw value, or case-insensitive substring for strings.
pub fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.contains(needle),
        Value::String(s) => s.to_lowercase().contains(&needle_string(needle).to_lowercase()),
        _ => false,
    }
}

/// `String(needle)`: a missing answer reads as `"undefined"`, never as `""`.
fn needle_string(needle: &Value) -> String {
    match needle {
        Value::Null => "undefined".to_string(),
        other => other.to_js_string(),
    }
}

pub fn any_of(l: &Value, r: &Value) -> bool {
    let Value::Array(pool) = r else { return false };
    match l {
        Value::Array(items) => items.iter().any(|x| pool.contains(x)),
        scalar => pool.contains(scalar),
    }
}

pub fn all_of(l: &Value, r: &Value) -> bool {
    let Value::Array(pool) = r else { return false };
    match l {
        Value::Array(items) => items.iter().all(|x| pool.contains(x)),
        scalar => pool.contains(scalar),
    }
}
