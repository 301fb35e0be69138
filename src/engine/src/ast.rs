//! Expression tree

use std::fmt;

/// Parsed trait expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// String literal
    Literal(String),
    /// Dotted identifier path, e.g. `external.groups`
    Ident(Vec<String>),
    /// Property access, e.g. `external["groups"]`
    Index { target: Box<Expr>, key: Box<Expr> },
    /// Builtin function call
    Call { name: String, args: Vec<Expr> },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn lit(s: impl Into<String>) -> Self {
        Expr::Literal(s.into())
    }

    /// Build an identifier from a dotted path
    pub fn ident(path: &str) -> Self {
        Expr::Ident(path.split('.').map(str::to_string).collect())
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    pub fn index(target: Expr, key: Expr) -> Self {
        Expr::Index {
            target: Box::new(target),
            key: Box::new(key),
        }
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Nesting depth; leaves have depth 1
    pub fn depth(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Ident(_) => 1,
            Expr::Index { target, key } => 1 + target.depth().max(key.depth()),
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::depth).max().unwrap_or(0),
            Expr::And(l, r) | Expr::Or(l, r) => 1 + l.depth().max(r.depth()),
            Expr::Not(e) => 1 + e.depth(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(s) => write!(f, "{:?}", s),
            Expr::Ident(path) => write!(f, "{}", path.join(".")),
            Expr::Index { target, key } => write!(f, "{}[{}]", target, key),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::And(l, r) => write!(f, "({} && {})", l, r),
            Expr::Or(l, r) => write!(f, "({} || {})", l, r),
            Expr::Not(e) => write!(f, "!{}", e),
        }
    }
}
