use crate::context::EvalContext;
use crate::function::FunctionRegistry;
use crate::ops::{apply_binary, apply_unary};
use crate::value::Value;
use crate::EvalError;
use skiplogic_ast::{Expr, Literal};

/// Tree-walking interpreter over a borrowed function registry.
pub struct Evaluator<'r> {
    functions: &'r FunctionRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(functions: &'r FunctionRegistry) -> Self {
        Self { functions }
    }

    pub fn evaluate(&self, expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(l) => Ok(literal_to_value(l)),
            Expr::Variable { name } => Ok(ctx.resolve_variable(name)),
            Expr::Unary { op, arg } => Ok(apply_unary(*op, &self.evaluate(arg, ctx)?)),
            Expr::Binary { op, lhs, rhs } => {
                let l = self.evaluate(lhs, ctx)?;
                let r = self.evaluate(rhs, ctx)?;
                Ok(apply_binary(*op, &l, &r))
            }
            Expr::Call { name, args } => {
                let f = self.functions.get(name).ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
                let argv = args.iter().map(|a| self.evaluate(a, ctx)).collect::<Result<Vec<_>, _>>()?;
                f.call(&argv, ctx)
            }
            Expr::Array(items) => Ok(Value::Array(
                items.iter().map(|it| self.evaluate(it, ctx)).collect::<Result<Vec<_>, _>>()?,
            )),
        }
    }
}

fn literal_to_value(l: &Literal) -> Value {
    match l {
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}
