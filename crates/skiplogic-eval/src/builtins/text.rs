//! String builtins.

use super::{arg, num};
use crate::context::EvalContext;
use crate::value::Value;
use crate::EvalError;
use regex::Regex;

fn text(args: &[Value], i: usize) -> String {
    arg(args, i).to_js_string()
}

pub fn lower(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(text(args, 0).to_lowercase()))
}

pub fn upper(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(text(args, 0).to_uppercase()))
}

pub fn trim(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(text(args, 0).trim().to_string()))
}

/// Character count for strings, element count for arrays.
pub fn length(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let n = match arg(args, 0) {
        Value::Array(items) => items.len(),
        other => other.to_js_string().chars().count(),
    };
    Ok(Value::Number(n as f64))
}

/// `substring(s, start, end?)`: indices clamp to the string and swap when reversed.
pub fn substring(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let chars: Vec<char> = text(args, 0).chars().collect();
    let len = chars.len() as f64;
    let clamp = |n: f64| n.clamp(0.0, len) as usize;
    let start = clamp(num(args, 1));
    let end = match arg(args, 2) {
        Value::Null => chars.len(),
        v => clamp(v.number_or_zero()),
    };
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(Value::String(chars[from..to].iter().collect()))
}

pub fn concat(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(args.iter().map(Value::to_js_string).collect()))
}

/// `replace(s, pattern, replacement)`: every match of the regex `pattern`.
pub fn replace(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let re = Regex::new(&text(args, 1)).map_err(|e| EvalError::Regex(e.to_string()))?;
    let out = re.replace_all(&text(args, 0), text(args, 2).as_str()).into_owned();
    Ok(Value::String(out))
}

/// Character index of the first occurrence, element index for arrays, `-1` if absent.
pub fn indexof(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let needle = arg(args, 1);
    let idx = match arg(args, 0) {
        Value::Array(items) => items.iter().position(|x| x == needle),
        other => {
            let hay = other.to_js_string();
            hay.find(&needle.to_js_string()).map(|byte| hay[..byte].chars().count())
        }
    };
    Ok(Value::Number(idx.map(|i| i as f64).unwrap_or(-1.0)))
}
