//! Array builtins.

use super::arg;
use crate::context::EvalContext;
use crate::ops;
use crate::value::Value;
use crate::EvalError;

fn separator(args: &[Value], i: usize) -> String {
    match arg(args, i) {
        Value::Null => ",".to_string(),
        v => v.to_js_string(),
    }
}

/// `join(array, sep = ",")`
pub fn join(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let sep = separator(args, 1);
    let out = match arg(args, 0) {
        Value::Array(items) => items.iter().map(Value::to_js_string).collect::<Vec<_>>().join(&sep),
        other => other.to_js_string(),
    };
    Ok(Value::String(out))
}

/// `split(text, sep = ",")`; an empty text yields an empty array.
pub fn split(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let s = arg(args, 0).to_js_string();
    if s.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    let sep = separator(args, 1);
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(sep.as_str()).map(Value::from).collect()
    };
    Ok(Value::Array(parts))
}

pub fn first(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(arg(args, 0).as_array().and_then(|a| a.first()).cloned().unwrap_or_default())
}

pub fn last(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(arg(args, 0).as_array().and_then(|a| a.last()).cloned().unwrap_or_default())
}

/// Function form of the `contains` operator.
pub fn contains(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(ops::contains(arg(args, 0), arg(args, 1))))
}
