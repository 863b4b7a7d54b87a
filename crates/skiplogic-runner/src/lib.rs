//!
//! Survey-facing expression runner.
//!
//! Responsibilities:
//! - Cache parsed expressions by source text (`ExpressionCache`).
//! - Evaluate with caller defaults instead of errors (`ExpressionEngine::run_expression`).
//! - Survey semantics over a schema: visibility, enablement, requiredness,
//!   calculated values, triggers and navigation (`SurveyExpressionRunner`).

pub mod cache;
pub mod engine;
pub mod schema;
pub mod survey;

use skiplogic_dsl::DslError;
use skiplogic_eval::EvalError;
use thiserror::Error;

pub use cache::{CacheConfig, ExpressionCache};
pub use engine::{EngineConfig, ExpressionEngine, ExpressionReport, RunOptions};
pub use schema::{CalculatedValue, Element, Page, SurveySchema, Trigger, TriggerKind, Validator, ValidatorKind};
pub use skiplogic_dsl::{extract_variables, parse_expression, validate_expression, ExpressionCheck};
pub use skiplogic_eval::{Value, ValueMap};
pub use survey::{NavigationStep, SurveyExpressionRunner, TriggerAction};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("syntax error: {0}")]
    Syntax(#[from] DslError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}
