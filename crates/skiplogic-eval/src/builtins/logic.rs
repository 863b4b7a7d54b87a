//! Conditional, predicate and coercion builtins.

use super::arg;
use crate::context::EvalContext;
use crate::value::Value;
use crate::EvalError;

/// `iif(cond, then, else)`; both branches are already evaluated.
pub fn iif(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let pick = if arg(args, 0).truthy() { 1 } else { 2 };
    Ok(arg(args, pick).clone())
}

pub fn isempty(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(arg(args, 0).is_empty()))
}

pub fn isnotempty(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(!arg(args, 0).is_empty()))
}

/// Numbers and numeric strings; blank strings do not count.
pub fn isnumber(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let v = arg(args, 0);
    let yes = matches!(v, Value::Number(_) | Value::String(_)) && v.as_numeric().is_some();
    Ok(Value::Bool(yes))
}

pub fn isstring(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::String(_))))
}

pub fn isarray(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(arg(args, 0), Value::Array(_))))
}

pub fn int(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(arg(args, 0).number_or_zero().trunc()))
}

pub fn float(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(arg(args, 0).number_or_zero()))
}

pub fn str(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(arg(args, 0).to_js_string()))
}

pub fn bool(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(arg(args, 0).truthy()))
}

#[cfg(test)]
mod tests {
    use crate::builtins::test_support::call;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn iif_picks_branch() {
        assert_eq!(call("iif", vec![json!(1), json!("a"), json!("b")]), Value::from("a"));
        assert_eq!(call("iif", vec![json!(""), json!("a"), json!("b")]), Value::from("b"));
        assert_eq!(call("iif", vec![json!(false), json!("a")]), Value::Null);
    }

    #[test]
    fn predicates() {
        assert_eq!(call("isempty", vec![json!([])]), Value::Bool(true));
        assert_eq!(call("isnotempty", vec![json!(0)]), Value::Bool(true));
        assert_eq!(call("isnumber", vec![json!("3.5")]), Value::Bool(true));
        assert_eq!(call("isnumber", vec![json!("")]), Value::Bool(false));
        assert_eq!(call("isnumber", vec![json!(true)]), Value::Bool(false));
        assert_eq!(call("isstring", vec![json!("x")]), Value::Bool(true));
        assert_eq!(call("isarray", vec![json!("x")]), Value::Bool(false));
    }

    #[test]
    fn coercions() {
        assert_eq!(call("int", vec![json!("7.9")]), Value::Number(7.0));
        assert_eq!(call("int", vec![json!(-7.9)]), Value::Number(-7.0));
        assert_eq!(call("float", vec![json!("abc")]), Value::Number(0.0));
        assert_eq!(call("str", vec![json!(12)]), Value::from("12"));
        assert_eq!(call("bool", vec![json!("no")]), Value::Bool(true));
        assert_eq!(call("bool", vec![json!(0)]), Value::Bool(false));
    }
}
