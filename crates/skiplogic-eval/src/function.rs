use crate::context::EvalContext;
use crate::value::Value;
use crate::EvalError;
use std::collections::HashMap;
use std::sync::Arc;

/// Pluggable function implementation for `Expr::Call`.
///
/// Arguments arrive already evaluated, left to right.
pub trait Function: Send + Sync {
    fn call(&self, args: &[Value], ctx: &EvalContext<'_>) -> Result<Value, EvalError>;
}

impl<F> Function for F
where
    F: Fn(&[Value], &EvalContext<'_>) -> Result<Value, EvalError> + Send + Sync,
{
    fn call(&self, args: &[Value], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        self(args, ctx)
    }
}

#[derive(Default, Clone)]
/// Registry for callable functions referenced from expressions.
///
/// Names are case-insensitive; registering an existing name overwrites it.
pub struct FunctionRegistry {
    funcs: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self { funcs: HashMap::new() }
    }

    /// Default registry that includes the builtin library.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        crate::builtins::install(&mut r);
        r
    }

    pub fn register(&mut self, name: &str, f: Arc<dyn Function>) {
        self.funcs.insert(name.to_lowercase(), f);
    }

    pub fn register_fn<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value], &EvalContext<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.funcs.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.funcs.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry").field("functions", &self.names()).finish()
    }
}
