//! Precedence-climbing parser from tokens to `skiplogic_ast::Expr`.

use crate::lexer::{Token, TokenKind, TokenValue};
use serde::{Deserialize, Serialize};
use skiplogic_ast::{BinaryOp, Expr, Literal, UnaryOp, COMPARISON_PRECEDENCE};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected token {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },
    #[error("expected {expected}, found {found} at position {position}")]
    Expected { expected: &'static str, found: String, position: usize },
    #[error("unexpected {found} after complete expression at position {position}")]
    TrailingInput { found: String, position: usize },
    #[error("expression nested deeper than {limit} levels at position {position}")]
    TooDeep { limit: usize, position: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::Expected { position, .. }
            | ParseError::TrailingInput { position, .. }
            | ParseError::TooDeep { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Maximum AST height; also bounds parser recursion.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

enum Infix {
    Binary(BinaryOp),
    Postfix(UnaryOp),
}

impl Infix {
    fn precedence(&self) -> u8 {
        match self {
            Infix::Binary(op) => op.precedence(),
            Infix::Postfix(_) => COMPARISON_PRECEDENCE,
        }
    }
}

/// Parsed subtree paired with its height.
type Node = (Expr, usize);

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    recursion: usize,
    options: ParserOptions,
    eof: Token,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], options: ParserOptions) -> Self {
        let end = tokens.last().map(|t| t.position).unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            recursion: 0,
            options,
            eof: Token { kind: TokenKind::Eof, value: TokenValue::None, position: end },
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        let t = self.current();
        if t.kind != kind {
            return Err(ParseError::Expected { expected, found: t.to_string(), position: t.position });
        }
        Ok(self.advance())
    }

    fn too_deep(&self) -> ParseError {
        ParseError::TooDeep { limit: self.options.max_depth, position: self.current().position }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.recursion += 1;
        if self.recursion > self.options.max_depth {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.recursion -= 1;
    }

    fn node(&self, expr: Expr, depth: usize) -> Result<Node, ParseError> {
        if depth > self.options.max_depth {
            return Err(self.too_deep());
        }
        Ok((expr, depth))
    }

    fn infix(&self) -> Option<Infix> {
        let t = self.current();
        let sym = t.text()?;
        let op = match t.kind {
            TokenKind::Operator => match sym {
                "+" => BinaryOp::Add,
                "-" => BinaryOp::Sub,
                "*" => BinaryOp::Mul,
                "/" => BinaryOp::Div,
                "%" => BinaryOp::Mod,
                "^" => BinaryOp::Pow,
                _ => return None,
            },
            TokenKind::Comparison => match sym {
                "=" | "==" => BinaryOp::Eq,
                "<>" | "!=" => BinaryOp::Ne,
                "<" => BinaryOp::Lt,
                "<=" => BinaryOp::Le,
                ">" => BinaryOp::Gt,
                ">=" => BinaryOp::Ge,
                "contains" => BinaryOp::Contains,
                "notcontains" => BinaryOp::NotContains,
                "anyof" => BinaryOp::AnyOf,
                "allof" => BinaryOp::AllOf,
                "empty" => return Some(Infix::Postfix(UnaryOp::Empty)),
                "notempty" => return Some(Infix::Postfix(UnaryOp::NotEmpty)),
                _ => return None,
            },
            TokenKind::Logical => match sym {
                "and" => BinaryOp::And,
                "or" => BinaryOp::Or,
                _ => return None,
            },
            _ => return None,
        };
        Some(Infix::Binary(op))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Node, ParseError> {
        self.enter()?;
        let (mut lhs, mut depth) = self.parse_unary()?;
        while let Some(infix) = self.infix() {
            let prec = infix.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            (lhs, depth) = match infix {
                Infix::Postfix(op) => self.node(Expr::unary(op, lhs), depth + 1)?,
                Infix::Binary(op) => {
                    let (rhs, rdepth) = self.parse_binary(prec + 1)?;
                    self.node(Expr::binary(op, lhs, rhs), depth.max(rdepth) + 1)?
                }
            };
        }
        self.leave();
        Ok((lhs, depth))
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let t = self.current();
        let op = if t.kind == TokenKind::Logical && t.is_symbol("not") {
            UnaryOp::Not
        } else if t.kind == TokenKind::Operator && t.is_symbol("-") {
            UnaryOp::Negate
        } else {
            return self.parse_primary();
        };
        self.advance();
        self.enter()?;
        let (arg, depth) = self.parse_unary()?;
        self.leave();
        self.node(Expr::unary(op, arg), depth + 1)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let t = self.advance();
        match (t.kind, t.value) {
            (TokenKind::LParen, _) => {
                let inner = self.parse_binary(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            (TokenKind::Function, TokenValue::Text(name)) => {
                self.expect(TokenKind::LParen, "'('")?;
                let (args, depth) = self.parse_list(TokenKind::RParen, "')'")?;
                self.node(Expr::Call { name, args }, depth + 1)
            }
            (TokenKind::LBracket, _) => {
                let (items, depth) = self.parse_list(TokenKind::RBracket, "']'")?;
                self.node(Expr::Array(items), depth + 1)
            }
            (TokenKind::Variable, TokenValue::Text(name)) => Ok((Expr::Variable { name }, 1)),
            (TokenKind::Number, TokenValue::Number(n)) => Ok((Expr::Literal(Literal::Number(n)), 1)),
            (TokenKind::String, TokenValue::Text(s)) => Ok((Expr::Literal(Literal::String(s)), 1)),
            (TokenKind::Boolean, TokenValue::Bool(b)) => Ok((Expr::Literal(Literal::Bool(b)), 1)),
            (TokenKind::Boolean, TokenValue::Null) => Ok((Expr::Literal(Literal::Null), 1)),
            (kind, value) => {
                let found = Token { kind, value, position: t.position }.to_string();
                Err(ParseError::UnexpectedToken { found, position: t.position })
            }
        }
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_list(&mut self, close: TokenKind, expected: &'static str) -> Result<(Vec<Expr>, usize), ParseError> {
        let mut items = Vec::new();
        let mut depth = 0;
        if self.current().kind == close {
            self.advance();
            return Ok((items, depth));
        }
        loop {
            let (item, d) = self.parse_binary(0)?;
            items.push(item);
            depth = depth.max(d);
            if self.current().kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            self.expect(close, expected)?;
            return Ok((items, depth));
        }
    }
}

/// Parses a full token stream with default options.
pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    parse_with_options(tokens, ParserOptions::default())
}

/// Parses a full token stream; fails if tokens remain after one expression.
pub fn parse_with_options(tokens: &[Token], options: ParserOptions) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(tokens, options);
    let (expr, _) = parser.parse_binary(0)?;
    let rest = parser.current();
    if rest.kind != TokenKind::Eof {
        return Err(ParseError::TrailingInput { found: rest.to_string(), position: rest.position });
    }
    Ok(expr)
}
