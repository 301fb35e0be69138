//! Error types for trait expression parsing and evaluation

use thiserror::Error;

/// Trait expression errors
///
/// Every error aborts the enclosing evaluation. There is no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// Regular expression failed to compile (or exceeded the size limit)
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Operator was handed a value kind it does not accept
    #[error("type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Wrong argument kind to a variadic/flattening operator
    #[error("invalid argument to {function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    /// `option` was given a matcher spec other than a string
    #[error("unsupported matcher: {0}")]
    UnsupportedMatcher(&'static str),

    /// `match` exhausted its options without a default
    #[error("no option matched input {0:?}")]
    NoMatch(String),

    /// Identifier root other than `external`, or an unsupported path
    #[error("identifier {0:?} not found")]
    UnboundIdentifier(String),

    /// Function name is not in the registry
    #[error("unknown function {0:?}")]
    UnknownFunction(String),

    /// Builtin called with the wrong number of arguments
    #[error("{function} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        function: &'static str,
        expected: String,
        actual: usize,
    },

    /// Expression text could not be parsed
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// Engine configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configured resource bound was hit
    #[error("{limit} limit exceeded (max {max})")]
    LimitExceeded { limit: &'static str, max: usize },
}

impl ExprError {
    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }
}

/// Result type for trait expression operations
pub type Result<T> = std::result::Result<T, ExprError>;
