//! Expression parser
//!
//! Turns predicate-style source text into an [`Expr`] tree:
//!
//! ```text
//! expr    := or
//! or      := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | postfix
//! postfix := primary ( "[" expr "]" )*
//! primary := STRING | path [ "(" args ")" ] | "(" expr ")"
//! path    := IDENT ( "." IDENT )*
//! args    := [ expr ( "," expr )* [ "," ] ]
//! ```
//!
//! Strings are double-quoted with `\\ \" \' \n \r \t` escapes, or raw between
//! backticks.

use crate::ast::Expr;
use crate::config::EngineConfig;
use crate::error::{ExprError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Str(String),
    Ident(String),
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    AndAnd,
    OrOr,
    Bang,
    Eof,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Str(s) => format!("string {:?}", s),
            Tok::Ident(s) => format!("identifier {:?}", s),
            Tok::Dot => "'.'".to_string(),
            Tok::Comma => "','".to_string(),
            Tok::LParen => "'('".to_string(),
            Tok::RParen => "')'".to_string(),
            Tok::LBracket => "'['".to_string(),
            Tok::RBracket => "']'".to_string(),
            Tok::AndAnd => "'&&'".to_string(),
            Tok::OrOr => "'||'".to_string(),
            Tok::Bang => "'!'".to_string(),
            Tok::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn lex(src: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let tok = match c {
            '.' | ',' | '(' | ')' | '[' | ']' | '!' => {
                chars.next();
                match c {
                    '.' => Tok::Dot,
                    ',' => Tok::Comma,
                    '(' => Tok::LParen,
                    ')' => Tok::RParen,
                    '[' => Tok::LBracket,
                    ']' => Tok::RBracket,
                    _ => Tok::Bang,
                }
            }
            '&' | '|' => {
                chars.next();
                match chars.next() {
                    Some((_, next)) if next == c => {
                        if c == '&' {
                            Tok::AndAnd
                        } else {
                            Tok::OrOr
                        }
                    }
                    _ => return Err(ExprError::parse(offset, format!("expected '{}{}'", c, c))),
                }
            }
            '"' => {
                chars.next();
                let mut out = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((pos, '\\')) => {
                            let escaped = match chars.next() {
                                Some((_, '\\')) => '\\',
                                Some((_, '"')) => '"',
                                Some((_, '\'')) => '\'',
                                Some((_, 'n')) => '\n',
                                Some((_, 'r')) => '\r',
                                Some((_, 't')) => '\t',
                                Some((_, other)) => {
                                    return Err(ExprError::parse(
                                        pos,
                                        format!("unknown escape sequence '\\{}'", other),
                                    ))
                                }
                                None => return Err(ExprError::parse(offset, "unterminated string")),
                            };
                            out.push(escaped);
                        }
                        Some((_, ch)) => out.push(ch),
                        None => return Err(ExprError::parse(offset, "unterminated string")),
                    }
                }
                Tok::Str(out)
            }
            '`' => {
                chars.next();
                let mut out = String::new();
                loop {
                    match chars.next() {
                        Some((_, '`')) => break,
                        Some((_, ch)) => out.push(ch),
                        None => return Err(ExprError::parse(offset, "unterminated raw string")),
                    }
                }
                Tok::Str(out)
            }
            c if is_ident_start(c) => {
                let mut name = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if !is_ident_continue(ch) {
                        break;
                    }
                    name.push(ch);
                    chars.next();
                }
                Tok::Ident(name)
            }
            other => {
                return Err(ExprError::parse(offset, format!("unexpected character {:?}", other)))
            }
        };

        tokens.push(Token { tok, offset });
    }

    tokens.push(Token {
        tok: Tok::Eof,
        offset: src.len(),
    });
    Ok(tokens)
}

/// Recursive-descent parser with a nesting bound
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if &self.peek().tok == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<()> {
        let token = self.advance();
        if token.tok == tok {
            Ok(())
        } else {
            Err(ExprError::parse(
                token.offset,
                format!("expected {}, found {}", tok.describe(), token.tok.describe()),
            ))
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ExprError::LimitExceeded {
                limit: "expression depth",
                max: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = self.parse_or();
        self.leave();
        expr
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Tok::OrOr) {
            let rhs = self.parse_and()?;
            lhs = Expr::or(lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        while self.eat(&Tok::AndAnd) {
            let rhs = self.parse_unary()?;
            lhs = Expr::and(lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(&Tok::Bang) {
            self.enter()?;
            let inner = self.parse_unary();
            self.leave();
            return Ok(Expr::not(inner?));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat(&Tok::LBracket) {
            let key = self.parse_expr()?;
            self.expect(Tok::RBracket)?;
            expr = Expr::index(expr, key);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        match token.tok {
            Tok::Str(s) => Ok(Expr::Literal(s)),
            Tok::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Tok::RParen)?;
                Ok(inner)
            }
            Tok::Ident(first) => {
                let mut path = vec![first];
                while self.eat(&Tok::Dot) {
                    let next = self.advance();
                    match next.tok {
                        Tok::Ident(segment) => path.push(segment),
                        other => {
                            return Err(ExprError::parse(
                                next.offset,
                                format!("expected identifier after '.', found {}", other.describe()),
                            ))
                        }
                    }
                }
                if self.eat(&Tok::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::call(path.join("."), args))
                } else {
                    Ok(Expr::Ident(path))
                }
            }
            other => Err(ExprError::parse(
                token.offset,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    /// Arguments after the opening parenthesis; trailing comma allowed
    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        loop {
            if self.eat(&Tok::RParen) {
                return Ok(args);
            }
            args.push(self.parse_expr()?);
            if !self.eat(&Tok::Comma) {
                self.expect(Tok::RParen)?;
                return Ok(args);
            }
        }
    }
}

/// Parse with default limits
pub fn parse(src: &str) -> Result<Expr> {
    parse_with_config(src, &EngineConfig::default())
}

/// Parse under the given configuration's length and depth limits
pub fn parse_with_config(src: &str, config: &EngineConfig) -> Result<Expr> {
    if src.len() > config.max_expression_len {
        return Err(ExprError::LimitExceeded {
            limit: "expression length",
            max: config.max_expression_len,
        });
    }

    let mut parser = Parser {
        tokens: lex(src)?,
        pos: 0,
        depth: 0,
        max_depth: config.max_depth,
    };

    let expr = parser.parse_expr()?;
    let trailing = parser.peek();
    if trailing.tok != Tok::Eof {
        return Err(ExprError::parse(
            trailing.offset,
            format!("unexpected {} after expression", trailing.tok.describe()),
        ));
    }

    // `&&`/`||` chains fold without nesting the parser, but each node is a
    // level for the evaluator
    if expr.depth() > config.max_depth {
        return Err(ExprError::LimitExceeded {
            limit: "expression depth",
            max: config.max_depth,
        });
    }
    Ok(expr)
}
