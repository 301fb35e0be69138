//! Conditional operators: `ifelse`, `option`/`default_option`, `match`

use crate::error::{ExprError, Result};
use crate::value::Value;

use super::Operand;

/// Binary branch; both branches are already evaluated
pub fn ifelse(condition: bool, then_value: Value, else_value: Value) -> Result<Value> {
    for branch in [&then_value, &else_value] {
        if branch.is_bool() {
            return Err(ExprError::type_mismatch("ifelse branch", "string or list", "bool"));
        }
    }
    Ok(if condition { then_value } else { else_value })
}

/// Decides whether an option is selected for a `match` input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Input equals the string exactly
    Exact(String),
    /// Accepts every input
    Default,
}

impl Matcher {
    /// Build a matcher from an `option` spec; only strings are supported
    pub fn from_spec(spec: Operand) -> Result<Self> {
        match spec {
            Operand::Value(Value::Scalar(s)) => Ok(Matcher::Exact(s)),
            other => Err(ExprError::UnsupportedMatcher(other.kind())),
        }
    }

    /// `None` is an absent input, which no exact matcher accepts
    pub fn accepts(&self, input: Option<&str>) -> bool {
        match self {
            Matcher::Exact(expected) => input == Some(expected.as_str()),
            Matcher::Default => true,
        }
    }
}

/// One arm of a `match`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOption {
    pub matcher: Matcher,
    pub value: Value,
}

impl MatchOption {
    /// `option(spec, value)`
    pub fn new(spec: Operand, value: Value) -> Result<Self> {
        Ok(Self {
            matcher: Matcher::from_spec(spec)?,
            value: branch_value("option", value)?,
        })
    }

    /// `default_option(value)`
    pub fn default_option(value: Value) -> Result<Self> {
        Ok(Self {
            matcher: Matcher::Default,
            value: branch_value("default_option", value)?,
        })
    }
}

fn branch_value(context: &str, value: Value) -> Result<Value> {
    if value.is_bool() {
        return Err(ExprError::type_mismatch(context, "string or list", "bool"));
    }
    Ok(value)
}

/// Return the value of the first option accepting `input`
///
/// Options are tried strictly in order. A default placed early shadows every
/// later option. An absent input (`None`) falls through to the first default.
pub fn select(input: Option<&str>, options: Vec<MatchOption>) -> Result<Value> {
    options
        .into_iter()
        .find(|option| option.matcher.accepts(input))
        .map(|option| option.value)
        .ok_or_else(|| ExprError::NoMatch(input.unwrap_or_default().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(spec: &str, value: Value) -> MatchOption {
        MatchOption::new(Operand::Value(Value::scalar(spec)), value).unwrap()
    }

    #[test]
    fn test_ifelse_branches() {
        let a = Value::scalar("first");
        let b = Value::list(["second"]);
        assert_eq!(ifelse(true, a.clone(), b.clone()).unwrap(), a);
        assert_eq!(ifelse(false, a, b.clone()).unwrap(), b);
    }

    #[test]
    fn test_ifelse_rejects_bool_branch() {
        assert!(ifelse(true, Value::scalar("a"), Value::Bool(false)).is_err());
    }

    #[test]
    fn test_first_match_wins() {
        let options = vec![
            exact("a", Value::scalar("v1")),
            exact("a", Value::scalar("v2")),
        ];
        assert_eq!(select(Some("a"), options).unwrap(), Value::scalar("v1"));
    }

    #[test]
    fn test_default_option() {
        let options = vec![
            exact("a", Value::list(["x"])),
            MatchOption::default_option(Value::list(["default"])).unwrap(),
        ];
        assert_eq!(select(Some("z"), options).unwrap(), Value::list(["default"]));
    }

    #[test]
    fn test_early_default_shadows_later_options() {
        let options = vec![
            MatchOption::default_option(Value::scalar("default")).unwrap(),
            exact("a", Value::scalar("a")),
        ];
        assert_eq!(select(Some("a"), options).unwrap(), Value::scalar("default"));
    }

    #[test]
    fn test_no_match() {
        let options = vec![exact("a", Value::scalar("x"))];
        assert_eq!(select(Some("b"), options), Err(ExprError::NoMatch("b".to_string())));
        assert!(matches!(select(Some("b"), vec![]), Err(ExprError::NoMatch(_))));
    }

    #[test]
    fn test_absent_input_only_selects_default() {
        let options = vec![
            exact("a", Value::scalar("a")),
            MatchOption::default_option(Value::list(["fallback"])).unwrap(),
        ];
        assert_eq!(select(None, options).unwrap(), Value::list(["fallback"]));

        let options = vec![exact("", Value::scalar("empty"))];
        assert_eq!(select(None, options), Err(ExprError::NoMatch(String::new())));
    }

    #[test]
    fn test_unsupported_matcher() {
        assert_eq!(
            Matcher::from_spec(Operand::Value(Value::list(["a", "b"]))),
            Err(ExprError::UnsupportedMatcher("list"))
        );
        assert_eq!(
            Matcher::from_spec(Operand::Value(Value::Bool(true))),
            Err(ExprError::UnsupportedMatcher("bool"))
        );
    }
}
