//! Runtime value model
//!
//! The engine only knows strings, lists of strings and booleans. Trait values
//! are naturally lists, so a bare scalar is accepted wherever a list is
//! expected and a one-element list is accepted wherever a scalar is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ExprError, Result};

/// Value produced by evaluating an expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Single string
    Scalar(String),
    /// Ordered strings, duplicates allowed
    List(Vec<String>),
    /// Only produced by predicate operators, never stored in traits
    Bool(bool),
}

impl Value {
    /// Create a scalar value
    pub fn scalar(s: impl Into<String>) -> Self {
        Value::Scalar(s.into())
    }

    /// Create a list value from anything yielding strings
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "string",
            Value::List(_) => "list",
            Value::Bool(_) => "bool",
        }
    }

    /// Borrow as a list; a scalar is viewed as a list of one
    pub fn as_list(&self, context: &str) -> Result<&[String]> {
        match self {
            Value::Scalar(s) => Ok(std::slice::from_ref(s)),
            Value::List(items) => Ok(items),
            Value::Bool(_) => Err(ExprError::type_mismatch(context, "list", self.kind())),
        }
    }

    /// Borrow as a scalar; a list of exactly one element is accepted
    pub fn as_scalar(&self, context: &str) -> Result<&str> {
        match self {
            Value::Scalar(s) => Ok(s),
            Value::List(items) if items.len() == 1 => Ok(&items[0]),
            _ => Err(ExprError::type_mismatch(context, "string", self.kind())),
        }
    }

    /// Extract a boolean
    pub fn as_bool(&self, context: &str) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(ExprError::type_mismatch(context, "bool", self.kind())),
        }
    }

    /// Consume into an owned list
    pub fn into_list(self, context: &str) -> Result<Vec<String>> {
        match self {
            Value::Scalar(s) => Ok(vec![s]),
            Value::List(items) => Ok(items),
            Value::Bool(_) => Err(ExprError::type_mismatch(context, "list", "bool")),
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
