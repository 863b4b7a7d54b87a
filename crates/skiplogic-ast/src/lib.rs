//!
//! AST types for the survey logic expression language.
//!
//! This crate is intentionally small and shared by:
//! - the lexer/parser (`skiplogic-dsl`),
//! - the evaluator (`skiplogic-eval`),
//! - and tooling around expressions (dependency extraction, hashing).
//!
//! Key features:
//! - `Expr`: the expression AST used across the system.
//! - `BinaryOp::precedence`: the binding table the parser climbs.
//! - `ast_hash`: stable hash of the canonical JSON representation.
//! - `extract_dependencies`: walks the AST and returns referenced variables and functions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Negate,
    /// Postfix `x empty`.
    Empty,
    /// Postfix `x notempty`.
    NotEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    NotContains,
    AnyOf,
    AllOf,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    /// Binding strength, higher binds tighter.
    ///
    /// `empty`/`notempty` are not binary but sit at the comparison level (3).
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Contains
            | BinaryOp::NotContains
            | BinaryOp::AnyOf
            | BinaryOp::AllOf => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
            BinaryOp::Pow => 6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Contains => "contains",
            BinaryOp::NotContains => "notcontains",
            BinaryOp::AnyOf => "anyof",
            BinaryOp::AllOf => "allof",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Comparison-level precedence, shared by the postfix emptiness checks.
pub const COMPARISON_PRECEDENCE: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Expression AST.
///
/// Notes:
/// - Immutable once built; a pure tree without back-references.
/// - `Variable.name` keeps the raw path (`q1`, `q1.answer`, `matrix.0`).
/// - `Call` is resolved through a function registry at evaluation time.
pub enum Expr {
    Literal(Literal),
    Variable { name: String },
    Unary { op: UnaryOp, arg: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Call { name: String, args: Vec<Expr> },
    Array(Vec<Expr>),
}

impl Expr {
    pub fn number(n: f64) -> Self {
        Expr::Literal(Literal::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable { name: name.into() }
    }

    pub fn unary(op: UnaryOp, arg: Expr) -> Self {
        Expr::Unary { op, arg: Box::new(arg) }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    /// Height of the tree; a lone literal has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Variable { .. } => 1,
            Expr::Unary { arg, .. } => 1 + arg.depth(),
            Expr::Binary { lhs, rhs, .. } => 1 + lhs.depth().max(rhs.depth()),
            Expr::Call { args, .. } | Expr::Array(args) => {
                1 + args.iter().map(Expr::depth).max().unwrap_or(0)
            }
        }
    }
}

pub fn canonical_json(expr: &Expr) -> serde_json::Value {
    serde_json::to_value(expr).expect("Expr serializable")
}

pub fn ast_hash(expr: &Expr) -> String {
    let v = canonical_json(expr);
    let bytes = serde_json::to_vec(&v).expect("json");
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Dependencies extracted from an expression: variable paths and function calls.
///
/// This powers:
/// - deploy-time validation (detect unknown functions),
/// - impact analysis ("which conditions read question X?").
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dependencies {
    pub variables: HashSet<String>,
    pub functions: HashSet<String>,
}

impl Dependencies {
    /// Head segments of the variable paths (`q1.answer` -> `q1`).
    pub fn base_names(&self) -> HashSet<String> {
        self.variables
            .iter()
            .map(|v| v.split('.').next().unwrap_or(v).to_string())
            .collect()
    }
}

/// Walks the AST and returns the set of variable paths and (lowercased) function names.
pub fn extract_dependencies(expr: &Expr) -> Dependencies {
    let mut d = Dependencies::default();
    walk(expr, &mut d);
    d
}

fn walk(expr: &Expr, d: &mut Dependencies) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Variable { name } => {
            d.variables.insert(name.clone());
        }
        Expr::Unary { arg, .. } => walk(arg, d),
        Expr::Binary { lhs, rhs, .. } => {
            walk(lhs, d);
            walk(rhs, d);
        }
        Expr::Call { name, args } => {
            d.functions.insert(name.to_lowercase());
            for a in args {
                walk(a, d);
            }
        }
        Expr::Array(items) => {
            for it in items {
                walk(it, d);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expr {
        // iif({q1.score} >= 9, 'promoter', {fallback})
        Expr::Call {
            name: "IIF".into(),
            args: vec![
                Expr::binary(BinaryOp::Ge, Expr::variable("q1.score"), Expr::number(9.0)),
                Expr::string("promoter"),
                Expr::variable("fallback"),
            ],
        }
    }

    #[test]
    fn precedence_table_orders_operator_families() {
        assert!(BinaryOp::Or.precedence() < BinaryOp::And.precedence());
        assert!(BinaryOp::And.precedence() < BinaryOp::Contains.precedence());
        assert_eq!(BinaryOp::AllOf.precedence(), COMPARISON_PRECEDENCE);
        assert!(BinaryOp::Add.precedence() < BinaryOp::Mod.precedence());
        assert!(BinaryOp::Mul.precedence() < BinaryOp::Pow.precedence());
    }

    #[test]
    fn dependencies_cover_variables_and_functions() {
        let d = extract_dependencies(&sample());
        assert!(d.variables.contains("q1.score"));
        assert!(d.variables.contains("fallback"));
        assert!(d.functions.contains("iif"));
        assert!(d.base_names().contains("q1"));
    }

    #[test]
    fn hash_is_structural() {
        assert_eq!(ast_hash(&sample()), ast_hash(&sample().clone()));
        assert_ne!(ast_hash(&sample()), ast_hash(&Expr::number(9.0)));
    }

    #[test]
    fn depth_counts_nesting() {
        assert_eq!(Expr::number(1.0).depth(), 1);
        assert_eq!(sample().depth(), 3);
    }
}
