//! Math and aggregation builtins.

use super::{items, num, round_half_up};
use crate::context::EvalContext;
use crate::value::Value;
use crate::EvalError;

pub fn abs(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(num(args, 0).abs()))
}

pub fn ceil(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(num(args, 0).ceil()))
}

pub fn floor(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(num(args, 0).floor()))
}

/// `round(x, digits = 0)`
pub fn round(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let digits = num(args, 1).trunc() as i32;
    Ok(Value::Number(round_half_up(num(args, 0), digits)))
}

pub fn pow(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(num(args, 0).powf(num(args, 1))))
}

pub fn sqrt(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(num(args, 0).sqrt()))
}

/// Natural logarithm.
pub fn log(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(num(args, 0).ln()))
}

pub fn exp(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(num(args, 0).exp()))
}

/// Entries that carry a number; nulls, blanks and text are dropped.
fn numbers(args: &[Value]) -> Vec<f64> {
    items(args).into_iter().filter_map(Value::as_numeric).collect()
}

pub fn sum(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(numbers(args).iter().sum()))
}

pub fn avg(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let ns = numbers(args);
    if ns.is_empty() {
        return Ok(Value::Number(0.0));
    }
    Ok(Value::Number(ns.iter().sum::<f64>() / ns.len() as f64))
}

pub fn min(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(numbers(args).into_iter().reduce(f64::min).unwrap_or(0.0)))
}

pub fn max(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(Value::Number(numbers(args).into_iter().reduce(f64::max).unwrap_or(0.0)))
}

/// Number of non-empty entries.
pub fn count(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let n = items(args).into_iter().filter(|v| !v.is_empty()).count();
    Ok(Value::Number(n as f64))
}

#[cfg(test)]
mod tests {
    use crate::builtins::test_support::call;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn unary_math() {
        assert_eq!(call("abs", vec![json!(-3)]), Value::Number(3.0));
        assert_eq!(call("ceil", vec![json!("2.1")]), Value::Number(3.0));
        assert_eq!(call("floor", vec![json!(2.9)]), Value::Number(2.0));
        assert_eq!(call("sqrt", vec![json!(16)]), Value::Number(4.0));
        assert_eq!(call("exp", vec![json!(0)]), Value::Number(1.0));
        assert_eq!(call("log", vec![json!(1)]), Value::Number(0.0));
        assert_eq!(call("pow", vec![json!(3), json!(2)]), Value::Number(9.0));
    }

    #[test]
    fn round_with_digits() {
        assert_eq!(call("round", vec![json!(2.5)]), Value::Number(3.0));
        assert_eq!(call("round", vec![json!(3.14159), json!(2)]), Value::Number(3.14));
    }

    #[test]
    fn aggregations_skip_non_numeric() {
        assert_eq!(call("sum", vec![json!([1, "2", "x", null])]), Value::Number(3.0));
        assert_eq!(call("sum", vec![json!(1), json!(2), json!([3, 4])]), Value::Number(10.0));
        assert_eq!(call("avg", vec![json!([2, "x", 4])]), Value::Number(3.0));
        assert_eq!(call("min", vec![json!([5, "a", 2, 9])]), Value::Number(2.0));
        assert_eq!(call("max", vec![json!(5), json!("11"), json!(9)]), Value::Number(11.0));
        assert_eq!(call("count", vec![json!([1, null, "", "a"])]), Value::Number(2.0));
    }

    #[test]
    fn aggregations_of_nothing_are_zero() {
        assert_eq!(call("avg", vec![json!([])]), Value::Number(0.0));
        assert_eq!(call("min", vec![json!(["x"])]), Value::Number(0.0));
        assert_eq!(call("max", vec![]), Value::Number(0.0));
        assert_eq!(call("sum", vec![]), Value::Number(0.0));
    }
}
