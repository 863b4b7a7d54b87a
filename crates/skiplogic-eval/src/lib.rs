//!
//! Runtime evaluator for survey logic expressions.
//!
//! Responsibilities:
//! - Evaluate AST (`skiplogic-ast::Expr`) against a layered `EvalContext`.
//! - Loose, JavaScript-flavoured coercions (`Value::loose_eq`, `Value::truthy`, ...).
//! - Pluggable functions via `FunctionRegistry`, seeded with the builtin library.
//!
//! Assumptions:
//! - Both operands of `and`/`or` are always evaluated.
//! - Callers decide what an `EvalError` degrades to; this crate only reports it.

pub mod builtins;
pub mod context;
pub mod evaluator;
pub mod function;
pub mod ops;
pub mod value;

use skiplogic_ast::Expr;
use std::sync::LazyLock;
use thiserror::Error;

pub use context::{EvalContext, ValueMap};
pub use evaluator::Evaluator;
pub use function::{Function, FunctionRegistry};
pub use value::Value;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// For host-registered functions rejecting their inputs.
    #[error("{function}: {message}")]
    Argument { function: &'static str, message: String },
    #[error("regex error: {0}")]
    Regex(String),
}

static BUILTINS: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::with_builtins);

/// Evaluate using the default builtin function registry.
///
/// For custom functions, use `eval_with_registry`.
pub fn eval(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    eval_with_registry(expr, ctx, &BUILTINS)
}

/// Evaluate using a caller-provided function registry.
pub fn eval_with_registry(expr: &Expr, ctx: &EvalContext<'_>, fns: &FunctionRegistry) -> Result<Value, EvalError> {
    Evaluator::new(fns).evaluate(expr, ctx)
}
