//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Plural expression parser and evaluator
//!
//! This module parses and evaluates plural form expressions as used in GNU gettext.
//! These expressions are C-style expressions that determine which plural form to use
//! based on a count value `n`.
//!
//! Example expressions:
//! - English: `(n != 1)` - 2 forms: singular when n=1, plural otherwise
//! - Polish: `(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)` - 3 forms
//!
//! Expressions are never handed to a general purpose evaluator: the accepted
//! grammar is exactly what [`Parser`] understands, and anything else is
//! rejected with a [`PluralError`].

use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

static NPLURALS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^nplurals\s*=\s*(\d+)$").expect("invalid regex"));

static PLURAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^plural\s*=(.+)$").expect("invalid regex"));

/// Longest expression text the parser accepts, which also bounds the node
/// count and so the recursion depth of `evaluate` and drop
const MAX_EXPR_LEN: usize = 1024;

/// Deepest nesting of parentheses, `!` and ternary branches
const MAX_DEPTH: usize = 64;

/// A parsed plural expression that can be evaluated
#[derive(Debug, Clone, PartialEq)]
pub enum PluralExpr {
    /// The variable `n` (the count)
    N,
    /// A numeric literal
    Literal(u64),
    /// Logical negation (!)
    Not(Box<PluralExpr>),
    /// Binary operation
    BinaryOp(Box<PluralExpr>, BinaryOp, Box<PluralExpr>),
    /// Ternary conditional: condition ? if_true : if_false
    Ternary(Box<PluralExpr>, Box<PluralExpr>, Box<PluralExpr>),
}

/// Binary operators supported in plural expressions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    /// Equality (==)
    Eq,
    /// Inequality (!=)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
    /// Modulo (%)
    Mod,
    /// Logical AND (&&)
    And,
    /// Logical OR (||)
    Or,
}

/// Error type for plural expression parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluralError {
    /// Unexpected character
    #[error("unexpected character: '{0}'")]
    UnexpectedChar(char),
    /// Unexpected end of input
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Expected a specific token
    #[error("expected {0}")]
    Expected(String),
    /// Invalid expression
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
}

/// Token types for the lexer
#[derive(Debug, Clone, PartialEq)]
enum Token {
    N,
    Number(u64),
    LParen,
    RParen,
    Question,
    Colon,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Mod,
    And,
    Or,
    Eof,
}

/// Lexer for plural expressions
struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
        }
    }

    fn next_token(&mut self) -> Result<Token, PluralError> {
        self.skip_whitespace();

        let Some(c) = self.chars.peek().copied() else {
            return Ok(Token::Eof);
        };

        // ';' ends the expression inside a Plural-Forms header
        if c == ';' {
            return Ok(Token::Eof);
        }
        if c.is_ascii_digit() {
            return self.read_number();
        }

        self.chars.next();
        let token = match c {
            'n' => Token::N,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '?' => Token::Question,
            ':' => Token::Colon,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Mod,
            '=' => self.doubled('=', Token::Eq)?,
            '&' => self.doubled('&', Token::And)?,
            '|' => self.doubled('|', Token::Or)?,
            '!' => self.followed_by('=', Token::Ne, Token::Not),
            '<' => self.followed_by('=', Token::Le, Token::Lt),
            '>' => self.followed_by('=', Token::Ge, Token::Gt),
            _ => return Err(PluralError::UnexpectedChar(c)),
        };

        // `n` must not be the start of a longer identifier ("nplurals", "nn")
        if token == Token::N {
            if let Some(&next) = self.chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    return Err(PluralError::UnexpectedChar(next));
                }
            }
        }

        Ok(token)
    }

    /// Operators spelled with the same character twice: `==`, `&&`, `||`
    fn doubled(&mut self, c: char, token: Token) -> Result<Token, PluralError> {
        if self.chars.next_if_eq(&c).is_some() {
            Ok(token)
        } else {
            Err(PluralError::Expected(format!("'{}' after '{}'", c, c)))
        }
    }

    /// `long` if the next character is `next`, otherwise `short`
    fn followed_by(&mut self, next: char, long: Token, short: Token) -> Token {
        match self.chars.next_if_eq(&next) {
            Some(_) => long,
            None => short,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn read_number(&mut self) -> Result<Token, PluralError> {
        let mut value: u64 = 0;
        while let Some(digit) = self.chars.next_if(char::is_ascii_digit) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit) - u64::from(b'0')))
                .ok_or_else(|| PluralError::InvalidExpression("number too large".into()))?;
        }
        Ok(Token::Number(value))
    }
}

/// Parser for plural expressions
///
/// Operator precedence (lowest to highest), as in C:
/// 1. Ternary: ? : (right-associative)
/// 2. Logical OR: ||
/// 3. Logical AND: &&
/// 4. Equality: == !=
/// 5. Relational: < <= > >=
/// 6. Additive: + -
/// 7. Multiplicative: * / %
/// 8. Unary: !
/// 9. Primary: n, literals, (expr)
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Result<Self, PluralError> {
        if input.len() > MAX_EXPR_LEN {
            return Err(PluralError::InvalidExpression(format!(
                "expression longer than {} bytes",
                MAX_EXPR_LEN
            )));
        }
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            depth: 0,
        })
    }

    /// Parse the plural expression, which must span the whole input
    pub fn parse(&mut self) -> Result<PluralExpr, PluralError> {
        let expr = self.parse_ternary()?;
        if self.current != Token::Eof {
            return Err(PluralError::Expected(format!(
                "end of expression, found {:?}",
                self.current
            )));
        }
        Ok(expr)
    }

    fn advance(&mut self) -> Result<(), PluralError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), PluralError> {
        if self.current == expected {
            self.advance()
        } else if self.current == Token::Eof {
            Err(PluralError::UnexpectedEof)
        } else {
            Err(PluralError::Expected(format!("{:?}", expected)))
        }
    }

    /// Run a nested parse, failing once the nesting limit is reached
    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<PluralExpr, PluralError>,
    ) -> Result<PluralExpr, PluralError> {
        if self.depth >= MAX_DEPTH {
            return Err(PluralError::InvalidExpression(
                "expression nested too deeply".to_string(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // Ternary: or_expr ('?' ternary ':' ternary)?
    fn parse_ternary(&mut self) -> Result<PluralExpr, PluralError> {
        let cond = self.parse_or()?;

        if self.current == Token::Question {
            self.advance()?;
            let if_true = self.nested(Self::parse_ternary)?;
            self.expect(Token::Colon)?;
            let if_false = self.nested(Self::parse_ternary)?;
            Ok(PluralExpr::Ternary(
                Box::new(cond),
                Box::new(if_true),
                Box::new(if_false),
            ))
        } else {
            Ok(cond)
        }
    }

    /// Left-associative chain of binary operators at one precedence level
    fn parse_binary(
        &mut self,
        operand: fn(&mut Self) -> Result<PluralExpr, PluralError>,
        operator: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<PluralExpr, PluralError> {
        let mut left = operand(self)?;

        while let Some(op) = operator(&self.current) {
            self.advance()?;
            let right = operand(self)?;
            left = PluralExpr::BinaryOp(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    // Or: and_expr ('||' and_expr)*
    fn parse_or(&mut self) -> Result<PluralExpr, PluralError> {
        self.parse_binary(Self::parse_and, |t| match t {
            Token::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    // And: equality_expr ('&&' equality_expr)*
    fn parse_and(&mut self) -> Result<PluralExpr, PluralError> {
        self.parse_binary(Self::parse_equality, |t| match t {
            Token::And => Some(BinaryOp::And),
            _ => None,
        })
    }

    // Equality: relational_expr (('==' | '!=') relational_expr)*
    fn parse_equality(&mut self) -> Result<PluralExpr, PluralError> {
        self.parse_binary(Self::parse_relational, |t| match t {
            Token::Eq => Some(BinaryOp::Eq),
            Token::Ne => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    // Relational: additive_expr (('<' | '<=' | '>' | '>=') additive_expr)*
    fn parse_relational(&mut self) -> Result<PluralExpr, PluralError> {
        self.parse_binary(Self::parse_additive, |t| match t {
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    // Additive: multiplicative_expr (('+' | '-') multiplicative_expr)*
    fn parse_additive(&mut self) -> Result<PluralExpr, PluralError> {
        self.parse_binary(Self::parse_multiplicative, |t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    // Multiplicative: unary (('*' | '/' | '%') unary)*
    fn parse_multiplicative(&mut self) -> Result<PluralExpr, PluralError> {
        self.parse_binary(Self::parse_unary, |t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Mod => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    // Unary: '!' unary | primary
    fn parse_unary(&mut self) -> Result<PluralExpr, PluralError> {
        if self.current == Token::Not {
            self.advance()?;
            let operand = self.nested(Self::parse_unary)?;
            Ok(PluralExpr::Not(Box::new(operand)))
        } else {
            self.parse_primary()
        }
    }

    // Primary: 'n' | number | '(' ternary ')'
    fn parse_primary(&mut self) -> Result<PluralExpr, PluralError> {
        match self.current {
            Token::N => {
                self.advance()?;
                Ok(PluralExpr::N)
            }
            Token::Number(v) => {
                self.advance()?;
                Ok(PluralExpr::Literal(v))
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.nested(Self::parse_ternary)?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::Eof => Err(PluralError::UnexpectedEof),
            _ => Err(PluralError::Expected("n, number, or '('".to_string())),
        }
    }
}

impl PluralExpr {
    /// Parse a plural expression from a string
    pub fn parse(input: &str) -> Result<Self, PluralError> {
        let mut parser = Parser::new(input)?;
        parser.parse()
    }

    /// Compile the `plural=` value of a Plural-Forms header
    ///
    /// The ternary branches are grouped with [`parenthesize_ternary`] before
    /// parsing.
    pub fn compile(input: &str) -> Result<Self, PluralError> {
        Self::parse(&parenthesize_ternary(input))
    }

    /// Evaluate the expression with the given value of n
    pub fn evaluate(&self, n: u64) -> u64 {
        match self {
            PluralExpr::N => n,
            PluralExpr::Literal(v) => *v,
            PluralExpr::Not(operand) => u64::from(operand.evaluate(n) == 0),
            PluralExpr::BinaryOp(left, op, right) => {
                let l = left.evaluate(n);
                match op {
                    // short-circuit like C
                    BinaryOp::And => return u64::from(l != 0 && right.evaluate(n) != 0),
                    BinaryOp::Or => return u64::from(l != 0 || right.evaluate(n) != 0),
                    _ => {}
                }
                let r = right.evaluate(n);
                match op {
                    BinaryOp::Eq => u64::from(l == r),
                    BinaryOp::Ne => u64::from(l != r),
                    BinaryOp::Lt => u64::from(l < r),
                    BinaryOp::Le => u64::from(l <= r),
                    BinaryOp::Gt => u64::from(l > r),
                    BinaryOp::Ge => u64::from(l >= r),
                    BinaryOp::Add => l.wrapping_add(r),
                    BinaryOp::Sub => l.wrapping_sub(r),
                    BinaryOp::Mul => l.wrapping_mul(r),
                    BinaryOp::Div => l.checked_div(r).unwrap_or(0),
                    BinaryOp::Mod => l.checked_rem(r).unwrap_or(0),
                    BinaryOp::And | BinaryOp::Or => unreachable!(),
                }
            }
            PluralExpr::Ternary(cond, if_true, if_false) => {
                if cond.evaluate(n) != 0 {
                    if_true.evaluate(n)
                } else {
                    if_false.evaluate(n)
                }
            }
        }
    }
}

/// Group every ternary branch in explicit parentheses
///
/// Each `?` opens a group, each `:` closes the current branch and opens the
/// next one, and the end of the expression (or a `;`) closes every group
/// still open.  `n==1 ? 0 : 1` becomes `n==1  ? ( 0 ) : ( 1)`.
pub fn parenthesize_ternary(expr: &str) -> String {
    let mut result = String::with_capacity(expr.len() * 2);
    let mut depth = 0usize;

    for c in expr.chars() {
        match c {
            '?' => {
                result.push_str(" ? (");
                depth += 1;
            }
            ':' => result.push_str(") : ("),
            ';' => {
                result.extend(std::iter::repeat(')').take(depth));
                result.push(';');
                depth = 0;
            }
            _ => result.push(c),
        }
    }
    result.extend(std::iter::repeat(')').take(depth));

    result
}

/// Values found in a "Plural-Forms:" header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluralForms {
    /// `nplurals=N`
    pub nplurals: Option<usize>,
    /// Compiled `plural=EXPR`
    pub expr: Option<PluralExpr>,
}

/// Parse the value of a "Plural-Forms:" header line
///
/// Expected format: "nplurals=N; plural=EXPR;".  Subfield names are matched
/// case-insensitively and may have whitespace around the `=`.
pub fn parse_plural_forms(header: &str) -> Result<PluralForms, PluralError> {
    let mut forms = PluralForms::default();

    for part in header.split(';') {
        let part = part.trim();
        if let Some(caps) = NPLURALS_RE.captures(part) {
            let nplurals = caps[1]
                .parse()
                .map_err(|_| PluralError::InvalidExpression(format!("nplurals={}", &caps[1])))?;
            forms.nplurals = Some(nplurals);
        } else if let Some(caps) = PLURAL_RE.captures(part) {
            forms.expr = Some(PluralExpr::compile(caps[1].trim())?);
        }
    }

    Ok(forms)
}

/// Plural form index used when a catalog has no plural expression
pub fn default_plural_index(n: u64) -> usize {
    if n == 1 {
        0
    } else {
        1
    }
}
