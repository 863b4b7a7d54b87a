//! Survey-specific builtins: NPS and context accessors.

use super::{arg, items, round_half_up};
use crate::context::EvalContext;
use crate::value::Value;
use crate::EvalError;

/// Net Promoter Score over 0-10 ratings, `null` when no rating is valid.
///
/// Promoters score 9-10, detractors 0-6; the result is
/// `round((promoters - detractors) / valid * 100)`.
pub fn nps(args: &[Value], _ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let scores: Vec<f64> = items(args)
        .into_iter()
        .filter_map(Value::as_numeric)
        .filter(|s| (0.0..=10.0).contains(s))
        .collect();
    if scores.is_empty() {
        return Ok(Value::Null);
    }
    let promoters = scores.iter().filter(|s| **s >= 9.0).count() as f64;
    let detractors = scores.iter().filter(|s| **s <= 6.0).count() as f64;
    let score = (promoters - detractors) / scores.len() as f64 * 100.0;
    Ok(Value::Number(round_half_up(score, 0)))
}

fn name(args: &[Value]) -> String {
    arg(args, 0).to_js_string()
}

/// `getvalue(name, prop?)` reads the answer values only.
pub fn getvalue(args: &[Value], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let value = ctx.value_path(&name(args));
    Ok(match arg(args, 1) {
        Value::Null => value,
        prop => value.navigate(&prop.to_js_string()).cloned().unwrap_or_default(),
    })
}

pub fn rowvalue(args: &[Value], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(ctx.row_value(&name(args)))
}

pub fn panelvalue(args: &[Value], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(ctx.panel_value(&name(args)))
}

pub fn propertyvalue(args: &[Value], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(ctx.property(&name(args)))
}

pub fn getvar(args: &[Value], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    Ok(ctx.variable(&name(args)))
}
