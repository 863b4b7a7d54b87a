//! Builtin function library.
//!
//! Builtins are lenient: missing arguments read as `null` and non-numeric
//! inputs coerce the same way operators do. Errors are reserved for
//! inputs that cannot mean anything (an invalid regex, say).

mod array;
mod datetime;
mod logic;
mod math;
mod survey;
mod text;

use crate::context::EvalContext;
use crate::function::FunctionRegistry;
use crate::value::Value;
use crate::EvalError;

type Builtin = fn(&[Value], &EvalContext<'_>) -> Result<Value, EvalError>;

const BUILTINS: &[(&str, Builtin)] = &[
    ("iif", logic::iif),
    ("isempty", logic::isempty),
    ("isnotempty", logic::isnotempty),
    ("isnumber", logic::isnumber),
    ("isstring", logic::isstring),
    ("isarray", logic::isarray),
    ("int", logic::int),
    ("float", logic::float),
    ("str", logic::str),
    ("bool", logic::bool),
    ("abs", math::abs),
    ("ceil", math::ceil),
    ("floor", math::floor),
    ("round", math::round),
    ("pow", math::pow),
    ("sqrt", math::sqrt),
    ("log", math::log),
    ("exp", math::exp),
    ("sum", math::sum),
    ("avg", math::avg),
    ("min", math::min),
    ("max", math::max),
    ("count", math::count),
    ("lower", text::lower),
    ("upper", text::upper),
    ("trim", text::trim),
    ("length", text::length),
    ("substring", text::substring),
    ("concat", text::concat),
    ("replace", text::replace),
    ("indexof", text::indexof),
    ("join", array::join),
    ("split", array::split),
    ("first", array::first),
    ("last", array::last),
    ("contains", array::contains),
    ("today", datetime::today),
    ("currentdate", datetime::currentdate),
    ("now", datetime::now),
    ("year", datetime::year),
    ("month", datetime::month),
    ("day", datetime::day),
    ("age", datetime::age),
    ("datediff", datetime::datediff),
    ("nps", survey::nps),
    ("getvalue", survey::getvalue),
    ("rowvalue", survey::rowvalue),
    ("panelvalue", survey::panelvalue),
    ("propertyvalue", survey::propertyvalue),
    ("getvar", survey::getvar),
];

pub(crate) fn install(registry: &mut FunctionRegistry) {
    for (name, f) in BUILTINS {
        registry.register_fn(name, *f);
    }
}

static NULL: Value = Value::Null;

fn arg(args: &[Value], i: usize) -> &Value {
    args.get(i).unwrap_or(&NULL)
}

fn num(args: &[Value], i: usize) -> f64 {
    arg(args, i).number_or_zero()
}

/// A single array argument, or the argument list itself, with nested arrays flattened one level.
fn items(args: &[Value]) -> Vec<&Value> {
    if let [Value::Array(single)] = args {
        return single.iter().collect();
    }
    args.iter()
        .flat_map(|a| match a {
            Value::Array(inner) => inner.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

/// Half-up rounding as survey authors expect (`2.5 -> 3`, `-2.5 -> -2`).
fn round_half_up(x: f64, digits: i32) -> f64 {
    let f = 10f64.powi(digits);
    (x * f + 0.5).floor() / f
}
