//! Builtin function registry

use std::fmt;
use std::str::FromStr;

use crate::error::{ExprError, Result};

/// Number of arguments a builtin takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Functions callable from an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Equals,
    Contains,
    Matches,
    Filter,
    Transform,
    Replace,
    IfElse,
    /// `list` and its alias `concat`
    List,
    Option,
    Match,
    DefaultOption,
}

impl Builtin {
    pub const ALL: [Builtin; 11] = [
        Builtin::Equals,
        Builtin::Contains,
        Builtin::Matches,
        Builtin::Filter,
        Builtin::Transform,
        Builtin::Replace,
        Builtin::IfElse,
        Builtin::List,
        Builtin::Option,
        Builtin::Match,
        Builtin::DefaultOption,
    ];

    /// Look up a builtin by the name used in expressions
    pub fn from_name(name: &str) -> Result<Self> {
        let builtin = match name {
            "equals" => Builtin::Equals,
            "contains" => Builtin::Contains,
            "matches" => Builtin::Matches,
            "filter" => Builtin::Filter,
            "transform" => Builtin::Transform,
            "replace" => Builtin::Replace,
            "ifelse" => Builtin::IfElse,
            "list" | "concat" => Builtin::List,
            "option" => Builtin::Option,
            "match" => Builtin::Match,
            "default_option" => Builtin::DefaultOption,
            _ => return Err(ExprError::UnknownFunction(name.to_string())),
        };
        Ok(builtin)
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Equals => "equals",
            Builtin::Contains => "contains",
            Builtin::Matches => "matches",
            Builtin::Filter => "filter",
            Builtin::Transform => "transform",
            Builtin::Replace => "replace",
            Builtin::IfElse => "ifelse",
            Builtin::List => "list",
            Builtin::Option => "option",
            Builtin::Match => "match",
            Builtin::DefaultOption => "default_option",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Builtin::Equals
            | Builtin::Contains
            | Builtin::Filter
            | Builtin::Transform
            | Builtin::Replace
            | Builtin::Option => Arity::Exact(2),
            Builtin::Matches | Builtin::DefaultOption => Arity::Exact(1),
            Builtin::IfElse => Arity::Exact(3),
            Builtin::List => Arity::AtLeast(0),
            Builtin::Match => Arity::AtLeast(1),
        }
    }

    /// Fail with `ArityMismatch` unless `count` arguments are acceptable
    pub fn check_arity(&self, count: usize) -> Result<()> {
        let arity = self.arity();
        if arity.accepts(count) {
            Ok(())
        } else {
            Err(ExprError::ArityMismatch {
                function: self.name(),
                expected: arity.to_string(),
                actual: count,
            })
        }
    }
}

impl FromStr for Builtin {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
