//! Lexer for survey logic expressions.
//!
//! Recognition order at each position: braced variable, string, number,
//! punctuation, comparison operators (longest first), math operators,
//! identifiers. Positions are character offsets into the input.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unclosed variable reference at position {position}")]
    UnclosedVariable { position: usize },
    #[error("unclosed string at position {position}")]
    UnclosedString { position: usize },
    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnclosedVariable { position }
            | LexError::UnclosedString { position }
            | LexError::InvalidNumber { position, .. }
            | LexError::UnexpectedChar { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    String,
    Boolean,
    Variable,
    Function,
    Operator,
    Comparison,
    Logical,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Number(f64),
    Text(String),
    Bool(bool),
    /// `null` / `undefined`, lexed as a BOOLEAN-kind token.
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, value: TokenValue, position: usize) -> Self {
        Self { kind, value, position }
    }

    /// Text payload for variables, functions, strings and operators.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for operator-family tokens whose symbol equals `sym`.
    pub fn is_symbol(&self, sym: &str) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Comparison | TokenKind::Logical)
            && self.text() == Some(sym)
    }

    /// Whether a following `-` must be read as an operator, not a sign.
    fn ends_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::Boolean
                | TokenKind::Variable
                | TokenKind::RParen
                | TokenKind::RBracket
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.value) {
            (TokenKind::Eof, _) => f.write_str("end of input"),
            (TokenKind::Variable, TokenValue::Text(s)) => write!(f, "{{{}}}", s),
            (TokenKind::String, TokenValue::Text(s)) => write!(f, "'{}'", s),
            (_, TokenValue::Text(s)) => f.write_str(s),
            (_, TokenValue::Number(n)) => write!(f, "{}", n),
            (_, TokenValue::Bool(b)) => write!(f, "{}", b),
            (_, TokenValue::Null) => f.write_str("null"),
            (TokenKind::LParen, _) => f.write_str("("),
            (TokenKind::RParen, _) => f.write_str(")"),
            (TokenKind::LBracket, _) => f.write_str("["),
            (TokenKind::RBracket, _) => f.write_str("]"),
            (TokenKind::Comma, _) => f.write_str(","),
            (TokenKind::Dot, _) => f.write_str("."),
            (kind, TokenValue::None) => write!(f, "{:?}", kind),
        }
    }
}

const COMPARISONS: [&str; 8] = ["<>", "<=", ">=", "!=", "==", "=", "<", ">"];
const MATH: [char; 6] = ['+', '-', '*', '/', '%', '^'];

/// Lexer over a character buffer.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer { input: input.chars().collect(), position: 0, tokens: Vec::new() }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    fn push(&mut self, kind: TokenKind, value: TokenValue, position: usize) {
        self.tokens.push(Token::new(kind, value, position));
    }

    /// Consumes the lexer, returning all tokens terminated by EOF.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.position += 1;
                continue;
            }
            let start = self.position;

            if ch == '{' {
                self.read_variable(start)?;
            } else if ch == '\'' || ch == '"' {
                self.read_string(ch, start)?;
            } else if self.at_number_start(ch) {
                self.read_number(start)?;
            } else if let Some(kind) = punctuation(ch) {
                self.position += 1;
                self.push(kind, TokenValue::None, start);
            } else if let Some(op) = COMPARISONS.iter().find(|op| self.starts_with(op)) {
                self.position += op.chars().count();
                self.push(TokenKind::Comparison, TokenValue::Text(op.to_string()), start);
            } else if MATH.contains(&ch) {
                self.position += 1;
                self.push(TokenKind::Operator, TokenValue::Text(ch.to_string()), start);
            } else if ch.is_alphabetic() || ch == '_' {
                self.read_identifier(start);
            } else {
                return Err(LexError::UnexpectedChar { ch, position: start });
            }
        }
        let end = self.input.len();
        self.push(TokenKind::Eof, TokenValue::None, end);
        Ok(self.tokens)
    }

    fn read_variable(&mut self, start: usize) -> Result<(), LexError> {
        let close = self.input[start + 1..]
            .iter()
            .position(|c| *c == '}')
            .ok_or(LexError::UnclosedVariable { position: start })?;
        let name: String = self.input[start + 1..start + 1 + close].iter().collect();
        self.position = start + close + 2;
        self.push(TokenKind::Variable, TokenValue::Text(name.trim().to_string()), start);
        Ok(())
    }

    fn read_string(&mut self, quote: char, start: usize) -> Result<(), LexError> {
        self.position += 1;
        let mut out = String::new();
        loop {
            match self.current() {
                None => return Err(LexError::UnclosedString { position: start }),
                Some('\\') => {
                    let escaped = self.peek(1).ok_or(LexError::UnclosedString { position: start })?;
                    out.push(escaped);
                    self.position += 2;
                }
                Some(c) if c == quote => {
                    self.position += 1;
                    break;
                }
                Some(c) => {
                    out.push(c);
                    self.position += 1;
                }
            }
        }
        self.push(TokenKind::String, TokenValue::Text(out), start);
        Ok(())
    }

    fn at_number_start(&self, ch: char) -> bool {
        if ch.is_ascii_digit() {
            return true;
        }
        ch == '-'
            && self.peek(1).is_some_and(|c| c.is_ascii_digit())
            && !self.tokens.last().is_some_and(Token::ends_operand)
    }

    fn read_number(&mut self, start: usize) -> Result<(), LexError> {
        if self.current() == Some('-') {
            self.position += 1;
        }
        while self.current().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.position += 1;
        }
        let text: String = self.input[start..self.position].iter().collect();
        // `1.2.3` is scanned as one token and rejected here.
        let n: f64 = text.parse().map_err(|_| LexError::InvalidNumber { text: text.clone(), position: start })?;
        self.push(TokenKind::Number, TokenValue::Number(n), start);
        Ok(())
    }

    fn read_identifier(&mut self, start: usize) {
        while self.current().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.position += 1;
        }
        let word: String = self.input[start..self.position].iter().collect();
        let lower = word.to_lowercase();
        let (kind, value) = match lower.as_str() {
            "true" => (TokenKind::Boolean, TokenValue::Bool(true)),
            "false" => (TokenKind::Boolean, TokenValue::Bool(false)),
            "null" | "undefined" => (TokenKind::Boolean, TokenValue::Null),
            "and" | "or" | "not" => (TokenKind::Logical, TokenValue::Text(lower)),
            "contains" | "notcontains" | "anyof" | "allof" | "empty" | "notempty" => {
                (TokenKind::Comparison, TokenValue::Text(lower))
            }
            _ if self.current() == Some('(') => (TokenKind::Function, TokenValue::Text(word)),
            _ => (TokenKind::Variable, TokenValue::Text(word)),
        };
        self.push(kind, value, start);
    }
}

fn punctuation(ch: char) -> Option<TokenKind> {
    Some(match ch {
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        _ => return None,
    })
}

/// Tokenizes `input`; the result always ends with an EOF token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lexer_variables() {
        let tokens = tokenize("{ q1.answer } = 'yes'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Variable);
        assert_eq!(tokens[0].text(), Some("q1.answer"));
        assert_eq!(tokens[1].kind, TokenKind::Comparison);
        assert_eq!(tokens[2].value, TokenValue::Text("yes".into()));
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lexer_unclosed_variable() {
        assert_eq!(tokenize("1 + {q1").unwrap_err(), LexError::UnclosedVariable { position: 4 });
    }

    #[test]
    fn test_lexer_strings() {
        let tokens = tokenize(r#""say \"hi\"" 'it\'s'"#).unwrap();
        assert_eq!(tokens[0].text(), Some("say \"hi\""));
        assert_eq!(tokens[1].text(), Some("it's"));
        assert_eq!(tokenize("'open").unwrap_err(), LexError::UnclosedString { position: 0 });
    }

    #[test]
    fn test_lexer_numbers() {
        let tokens = tokenize("42 3.5").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Number(42.0));
        assert_eq!(tokens[1].value, TokenValue::Number(3.5));
        assert_eq!(tokenize("-7").unwrap()[0].value, TokenValue::Number(-7.0));
        let tokens = tokenize("2 * -7").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[2].value, TokenValue::Number(-7.0));
    }

    #[test]
    fn test_lexer_minus_after_operand_is_operator() {
        assert_eq!(
            kinds("{a}-1"),
            vec![TokenKind::Variable, TokenKind::Operator, TokenKind::Number, TokenKind::Eof]
        );
        assert_eq!(kinds("(2)-1")[3], TokenKind::Operator);
        assert_eq!(kinds("2 * -1")[2], TokenKind::Number);
    }

    #[test]
    fn test_lexer_rejects_double_dot_number() {
        assert!(matches!(tokenize("1.2.3"), Err(LexError::InvalidNumber { position: 0, .. })));
    }

    #[test]
    fn test_lexer_comparisons_longest_first() {
        let tokens = tokenize("<> <= >= != == = < >").unwrap();
        let ops: Vec<_> = tokens.iter().filter_map(|t| t.text()).collect();
        assert_eq!(ops, vec!["<>", "<=", ">=", "!=", "==", "=", "<", ">"]);
    }

    #[test]
    fn test_lexer_keywords() {
        let tokens = tokenize("TRUE false Null undefined AND or Not Contains anyof notempty").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Bool(true));
        assert_eq!(tokens[1].value, TokenValue::Bool(false));
        assert_eq!(tokens[2], Token::new(TokenKind::Boolean, TokenValue::Null, 11));
        assert_eq!(tokens[3].value, TokenValue::Null);
        assert_eq!(tokens[4].kind, TokenKind::Logical);
        assert_eq!(tokens[4].text(), Some("and"));
        assert_eq!(tokens[6].text(), Some("not"));
        assert_eq!(tokens[7].kind, TokenKind::Comparison);
        assert_eq!(tokens[7].text(), Some("contains"));
        assert_eq!(tokens[9].text(), Some("notempty"));
    }

    #[test]
    fn test_lexer_function_vs_bare_variable() {
        assert_eq!(kinds("sum(age)")[..4], [TokenKind::Function, TokenKind::LParen, TokenKind::Variable, TokenKind::RParen]);
        assert_eq!(kinds("sum (1)")[0], TokenKind::Variable);
    }

    #[test]
    fn test_lexer_punctuation() {
        assert_eq!(
            kinds("[1, 2].x"),
            vec![
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::RBracket,
                TokenKind::Dot,
                TokenKind::Variable,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lexer_unexpected_char() {
        assert_eq!(tokenize("1 # 2").unwrap_err(), LexError::UnexpectedChar { ch: '#', position: 2 });
        assert_eq!(tokenize("!x").unwrap_err().position(), 0);
    }

    #[test]
    fn test_lexer_empty_input_is_just_eof() {
        assert_eq!(kinds("   "), vec![TokenKind::Eof]);
    }
}
