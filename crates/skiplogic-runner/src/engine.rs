//! Parse-with-cache + evaluate, degrading failures to caller defaults.

use crate::cache::{CacheConfig, ExpressionCache};
use crate::EngineError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use skiplogic_ast::{extract_dependencies, Expr};
use skiplogic_dsl::{parse_expression_with, ParserOptions};
use skiplogic_eval::{EvalContext, EvalError, Evaluator, Function, FunctionRegistry, Value, ValueMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub parser: ParserOptions,
}

/// Per-call inputs besides the answer values.
#[derive(Debug, Clone, Default)]
pub struct RunOptions<'a> {
    pub variables: Option<&'a ValueMap>,
    pub properties: Option<&'a ValueMap>,
    pub row: Option<&'a ValueMap>,
    pub panel: Option<&'a ValueMap>,
    /// Returned for a blank expression (else `true`) and on any failure (else `false`).
    pub default_value: Option<Value>,
}

impl<'a> RunOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variables(mut self, variables: &'a ValueMap) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn properties(mut self, properties: &'a ValueMap) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn row(mut self, row: &'a ValueMap) -> Self {
        self.row = Some(row);
        self
    }

    pub fn panel(mut self, panel: &'a ValueMap) -> Self {
        self.panel = Some(panel);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    fn context(&self, values: &'a ValueMap) -> EvalContext<'a> {
        EvalContext {
            values: Some(values),
            variables: self.variables,
            properties: self.properties,
            row: self.row,
            panel: self.panel,
        }
    }
}

/// Deploy-time report for an authored expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_functions: Vec<String>,
}

/// Owns the AST cache and the function registry shared by one survey session (or many).
pub struct ExpressionEngine {
    cache: ExpressionCache,
    /// Copy-on-write: evaluations run against a snapshot, never under the lock.
    functions: RwLock<Arc<FunctionRegistry>>,
    parser: ParserOptions,
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ExpressionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            cache: ExpressionCache::new(config.cache),
            functions: RwLock::new(Arc::new(FunctionRegistry::with_builtins())),
            parser: config.parser,
        }
    }

    pub fn cache(&self) -> &ExpressionCache {
        &self.cache
    }

    /// Parses through the cache.
    pub fn parse(&self, source: &str) -> Result<Arc<Expr>, EngineError> {
        let parser = self.parser;
        Ok(self.cache.get_or_parse(source, |s| parse_expression_with(s, parser))?)
    }

    /// Parses and evaluates, reporting failures instead of degrading them.
    pub fn evaluate(&self, source: &str, values: &ValueMap, options: &RunOptions<'_>) -> Result<Value, EngineError> {
        let expr = self.parse(source)?;
        let functions = self.functions.read().clone();
        Ok(Evaluator::new(&functions).evaluate(&expr, &options.context(values))?)
    }

    /// Evaluates `source`, never failing.
    ///
    /// A missing or blank expression yields the default (`true` if unset);
    /// a parse or evaluation failure is logged and yields the default
    /// (`false` if unset).
    pub fn run_expression(&self, source: Option<&str>, values: &ValueMap, options: &RunOptions<'_>) -> Value {
        let source = match source.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return options.default_value.clone().unwrap_or(Value::Bool(true)),
        };
        match self.evaluate(source, values, options) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(expression = source, error = %e, "expression failed, using default");
                options.default_value.clone().unwrap_or(Value::Bool(false))
            }
        }
    }

    /// Adds or replaces a function; names are case-insensitive.
    pub fn register_function<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Value], &EvalContext<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.functions.write()).register_fn(name, f);
    }

    pub fn register(&self, name: &str, f: Arc<dyn Function>) {
        Arc::make_mut(&mut self.functions.write()).register(name, f);
    }

    /// Sorted names of every callable function.
    pub fn available_functions(&self) -> Vec<String> {
        self.functions.read().names()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Syntax check plus a scan for calls the registry cannot resolve.
    pub fn check_expression(&self, source: &str) -> ExpressionReport {
        if source.trim().is_empty() {
            return ExpressionReport { valid: true, error: None, unknown_functions: Vec::new() };
        }
        let expr = match self.parse(source) {
            Ok(expr) => expr,
            Err(e) => return ExpressionReport { valid: false, error: Some(e.to_string()), unknown_functions: Vec::new() },
        };
        let functions = self.functions.read().clone();
        let mut unknown: Vec<String> = extract_dependencies(&expr)
            .functions
            .into_iter()
            .filter(|name| !functions.contains(name))
            .collect();
        unknown.sort();
        ExpressionReport { valid: unknown.is_empty(), error: None, unknown_functions: unknown }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(j: serde_json::Value) -> ValueMap {
        serde_json::from_value(j).unwrap()
    }

    #[test]
    fn missing_expression_defaults_to_true() {
        let engine = ExpressionEngine::default();
        let values = ValueMap::new();
        assert_eq!(engine.run_expression(None, &values, &RunOptions::new()), Value::Bool(true));
        assert_eq!(engine.run_expression(Some("  "), &values, &RunOptions::new()), Value::Bool(true));
        let opts = RunOptions::new().default_value(Value::Null);
        assert_eq!(engine.run_expression(None, &values, &opts), Value::Null);
    }

    #[test]
    fn failures_default_to_false() {
        let engine = ExpressionEngine::default();
        let values = ValueMap::new();
        assert_eq!(engine.run_expression(Some("nosuchfn(1)"), &values, &RunOptions::new()), Value::Bool(false));
        assert_eq!(engine.run_expression(Some("{a} >"), &values, &RunOptions::new()), Value::Bool(false));
        let opts = RunOptions::new().default_value(true);
        assert_eq!(engine.run_expression(Some("1 +"), &values, &opts), Value::Bool(true));
    }

    #[test]
    fn evaluate_reports_errors() {
        let engine = ExpressionEngine::default();
        let values = ValueMap::new();
        assert!(matches!(engine.evaluate("1 +", &values, &RunOptions::new()), Err(EngineError::Syntax(_))));
        assert!(matches!(engine.evaluate("zzz()", &values, &RunOptions::new()), Err(EngineError::Eval(_))));
    }

    #[test]
    fn context_layers_flow_through() {
        let engine = ExpressionEngine::default();
        let values = map(json!({"x": 1}));
        let variables = map(json!({"x": 2, "y": 5}));
        let row = map(json!({"price": 3}));
        let opts = RunOptions::new().variables(&variables).row(&row);
        assert_eq!(engine.run_expression(Some("{x}"), &values, &opts), Value::Number(1.0));
        assert_eq!(engine.run_expression(Some("{y} * rowvalue('price')"), &values, &opts), Value::Number(15.0));
    }

    #[test]
    fn registered_functions_are_callable_and_listed() {
        let engine = ExpressionEngine::default();
        engine.register_function("Double", |args, _ctx| {
            Ok(Value::Number(args.first().map(Value::number_or_zero).unwrap_or(0.0) * 2.0))
        });
        let values = map(json!({"n": 21}));
        assert_eq!(engine.run_expression(Some("double({n})"), &values, &RunOptions::new()), Value::Number(42.0));
        let names = engine.available_functions();
        assert!(names.contains(&"double".to_string()));
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn functions_may_register_while_running() {
        let engine = Arc::new(ExpressionEngine::default());
        let inner = Arc::clone(&engine);
        engine.register_function("install", move |_args, _ctx| {
            inner.register_function("late", |_args, _ctx| Ok(Value::from("late")));
            Ok(Value::Bool(true))
        });
        let values = ValueMap::new();
        assert_eq!(engine.run_expression(Some("install()"), &values, &RunOptions::new()), Value::Bool(true));
        assert_eq!(engine.run_expression(Some("late()"), &values, &RunOptions::new()), Value::from("late"));
    }

    #[test]
    fn check_flags_unknown_functions() {
        let engine = ExpressionEngine::default();
        let report = engine.check_expression("iif(foo({a}), bar(), 1)");
        assert!(!report.valid);
        assert_eq!(report.unknown_functions, vec!["bar", "foo"]);
        assert!(engine.check_expression("sum({a}, 1)").valid);
        let syntax = engine.check_expression("sum(");
        assert!(!syntax.valid && syntax.error.is_some());
    }

    #[test]
    fn results_are_stable_across_cached_runs() {
        let engine = ExpressionEngine::default();
        let values = map(json!({"q": 4}));
        let first = engine.run_expression(Some("{q} * 2 + 1"), &values, &RunOptions::new());
        let second = engine.run_expression(Some("{q} * 2 + 1"), &values, &RunOptions::new());
        assert_eq!(first, second);
        assert_eq!(engine.cache().len(), 1);
        engine.clear_cache();
        assert!(engine.cache().is_empty());
    }
}
