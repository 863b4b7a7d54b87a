//!
//! Parser for the survey logic expression language.
//!
//! Turns condition/calculation strings authored in the survey builder
//! (`{age} >= 18 and {country} anyof ['DE', 'FR']`) into the shared AST in
//! `skiplogic-ast`.
//!
//! Typical pipeline:
//! 1. Author writes an expression on a question (`visibleIf`, `requiredIf`, ...).
//! 2. Builder calls `validate_expression` to surface syntax errors inline.
//! 3. At completion time the runner parses (cached) and evaluates against answers.

pub mod lexer;
pub mod parser;

use regex::Regex;
use serde::Serialize;
use skiplogic_ast::Expr;
use std::sync::LazyLock;
use thiserror::Error;

pub use lexer::{tokenize, LexError, Lexer, Token, TokenKind, TokenValue};
pub use parser::{parse, parse_with_options, ParseError, ParserOptions};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DslError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl DslError {
    /// Character offset of the offending input.
    pub fn position(&self) -> usize {
        match self {
            DslError::Lex(e) => e.position(),
            DslError::Parse(e) => e.position(),
        }
    }
}

/// Parses expression text into an AST (`skiplogic_ast::Expr`).
pub fn parse_expression(input: &str) -> Result<Expr, DslError> {
    parse_expression_with(input, ParserOptions::default())
}

pub fn parse_expression_with(input: &str, options: ParserOptions) -> Result<Expr, DslError> {
    let tokens = tokenize(input)?;
    Ok(parse_with_options(&tokens, options)?)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Syntax check for the builder UI.
///
/// A blank expression is valid: it means "no condition".
pub fn validate_expression(input: &str) -> ExpressionCheck {
    if input.trim().is_empty() {
        return ExpressionCheck { valid: true, error: None };
    }
    match parse_expression(input) {
        Ok(_) => ExpressionCheck { valid: true, error: None },
        Err(e) => ExpressionCheck { valid: false, error: Some(e.to_string()) },
    }
}

static VARIABLE_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"));

/// Base names of all `{...}` references, de-duplicated in order of first appearance.
///
/// Text scan only; does not require the expression to parse.
pub fn extract_variables(input: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cap in VARIABLE_REF.captures_iter(input) {
        let path = cap[1].trim();
        let base = path.split(['.', '[']).next().unwrap_or(path).trim().to_string();
        if !base.is_empty() && !out.contains(&base) {
            out.push(base);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiplogic_ast::ast_hash;

    #[test]
    fn parses_same_source_to_identical_ast() {
        let src = "{q1} >= 9 and ({q2} empty or {q3.answer} contains 'x')";
        let a = parse_expression(src).unwrap();
        let b = parse_expression(src).unwrap();
        assert_eq!(a, b);
        assert_eq!(ast_hash(&a), ast_hash(&b));
    }

    #[test]
    fn dsl_error_positions() {
        assert_eq!(parse_expression("{a} = 'x").unwrap_err().position(), 6);
        assert_eq!(parse_expression("{a} = = 1").unwrap_err().position(), 6);
    }

    #[test]
    fn validate_reports_errors() {
        assert_eq!(validate_expression("{a} > 1"), ExpressionCheck { valid: true, error: None });
        assert!(validate_expression("").valid);
        let bad = validate_expression("{a} >");
        assert!(!bad.valid);
        assert!(bad.error.unwrap().contains("end of input"));
    }

    #[test]
    fn extract_variables_keeps_first_appearance_order() {
        let vars = extract_variables("{b.total} + {a} + {b} + {matrix[0]} + { c }");
        assert_eq!(vars, vec!["b", "a", "matrix", "c"]);
        assert!(extract_variables("1 + 2").is_empty());
    }
}
