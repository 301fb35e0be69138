//! Builtin operators
//!
//! Operators work on [`Operand`]s: plain [`Value`]s plus the first-class
//! objects some builtins return (compiled predicates, transforms, match
//! options and the bare trait mapping). Each operator checks the variants it
//! accepts and rejects anything else with a typed error.

pub mod conditional;
pub mod list;
pub mod string;

pub use conditional::{ifelse, select, MatchOption, Matcher};
pub use list::{filter, flatten, transform};
pub use string::{contains, equals, StringPredicate, StringTransform};

use crate::error::{ExprError, Result};
use crate::value::Value;

/// Intermediate result of evaluating a subexpression
#[derive(Debug, Clone)]
pub enum Operand {
    Value(Value),
    Predicate(StringPredicate),
    Transform(StringTransform),
    Option(MatchOption),
    /// Bare `external` identifier; only usable as an index target
    Traits,
}

impl Operand {
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Value(v) => v.kind(),
            Operand::Predicate(_) => "predicate",
            Operand::Transform(_) => "transform",
            Operand::Option(_) => "option",
            Operand::Traits => "trait mapping",
        }
    }

    /// Borrow the inner value, rejecting non-value operands
    pub fn as_value(&self, context: &str) -> Result<&Value> {
        match self {
            Operand::Value(v) => Ok(v),
            other => Err(ExprError::type_mismatch(context, "value", other.kind())),
        }
    }

    pub fn into_value(self, context: &str) -> Result<Value> {
        match self {
            Operand::Value(v) => Ok(v),
            other => Err(ExprError::type_mismatch(context, "value", other.kind())),
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}
