//! String operators: `matches`, `equals`, `contains`, `replace`

use regex::{Regex, RegexBuilder};

use crate::config::Limits;
use crate::error::{ExprError, Result};
use crate::value::Value;

fn compile(pattern: &str, limits: &Limits) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .size_limit(limits.max_regex_size)
        .build()
        .map_err(|e| ExprError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Compiled unary string predicate
///
/// Built once by `matches(...)` and applied to every element by `filter`.
/// Holds a compiled regex, so clones are cheap and safe to share.
#[derive(Debug, Clone)]
pub enum StringPredicate {
    /// Pattern found anywhere in the input (search, not anchored)
    Matches { regex: Regex, max_input_len: usize },
}

impl StringPredicate {
    /// Compile a `matches` predicate
    ///
    /// # Errors
    /// `InvalidPattern` if the regex does not compile or exceeds the size limit
    ///
    /// # Example
    /// ```text
    /// filter(external.groups, matches("^env-"))
    /// ```
    pub fn matches(pattern: &str, limits: &Limits) -> Result<Self> {
        Ok(StringPredicate::Matches {
            regex: compile(pattern, limits)?,
            max_input_len: limits.max_input_len,
        })
    }

    /// Apply the predicate to one string
    pub fn test(&self, input: &str) -> Result<bool> {
        match self {
            StringPredicate::Matches {
                regex,
                max_input_len,
            } => {
                check_input(input, *max_input_len)?;
                Ok(regex.is_match(input))
            }
        }
    }
}

/// Compiled unary string transform
#[derive(Debug, Clone)]
pub enum StringTransform {
    /// Substitute every match; non-matching input becomes `""`
    Replace {
        regex: Regex,
        replacement: String,
        max_input_len: usize,
    },
}

impl StringTransform {
    /// Compile a `replace` transform
    ///
    /// The replacement may reference capture groups (`$1`, `${name}`).
    pub fn replace(pattern: &str, replacement: impl Into<String>, limits: &Limits) -> Result<Self> {
        Ok(StringTransform::Replace {
            regex: compile(pattern, limits)?,
            replacement: replacement.into(),
            max_input_len: limits.max_input_len,
        })
    }

    /// Apply the transform to one string
    ///
    /// Input that the pattern does not match collapses to the empty string
    /// rather than passing through. Guard with `filter` + `matches` when
    /// passthrough is wanted.
    pub fn apply(&self, input: &str) -> Result<String> {
        match self {
            StringTransform::Replace {
                regex,
                replacement,
                max_input_len,
            } => {
                check_input(input, *max_input_len)?;
                if !regex.is_match(input) {
                    return Ok(String::new());
                }
                Ok(regex.replace_all(input, replacement.as_str()).into_owned())
            }
        }
    }
}

fn check_input(input: &str, max: usize) -> Result<()> {
    if input.len() > max {
        return Err(ExprError::LimitExceeded {
            limit: "regex input length",
            max,
        });
    }
    Ok(())
}

/// Structural equality of two strings
///
/// # Arguments
/// * `a`, `b` - scalars, or lists of exactly one element
pub fn equals(a: &Value, b: &Value) -> Result<bool> {
    Ok(a.as_scalar("equals")? == b.as_scalar("equals")?)
}

/// List membership or substring containment
///
/// The first argument's variant picks the semantics:
/// - `List`: true iff `needle` is an element
/// - `Scalar`: true iff `needle` is a substring
///
/// # Example
/// ```text
/// contains(external.groups, "contractors")
/// contains("nic@example.com", "@example.com")
/// ```
pub fn contains(haystack: &Value, needle: &Value) -> Result<bool> {
    let needle = needle.as_scalar("contains")?;
    match haystack {
        Value::List(items) => Ok(items.iter().any(|item| item == needle)),
        Value::Scalar(s) => Ok(s.contains(needle)),
        Value::Bool(_) => Err(ExprError::type_mismatch("contains", "list or string", "bool")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> Limits {
        Limits::default()
    }

    #[test]
    fn test_matches_searches_anywhere() {
        let pred = StringPredicate::matches("env", &limits()).unwrap();
        assert!(pred.test("env-staging").unwrap());
        assert!(pred.test("my-env").unwrap());
        assert!(!pred.test("devs").unwrap());
    }

    #[test]
    fn test_matches_anchors_respected() {
        let pred = StringPredicate::matches(r"^env-\w+$", &limits()).unwrap();
        assert!(pred.test("env-qa").unwrap());
        assert!(!pred.test("xenv-qa").unwrap());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            StringPredicate::matches("(", &limits()),
            Err(ExprError::InvalidPattern { .. })
        ));
        assert!(matches!(
            StringTransform::replace("[z-a]", "x", &limits()),
            Err(ExprError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_regex_size_limit() {
        let tiny = Limits {
            max_regex_size: 64,
            ..limits()
        };
        assert!(matches!(
            StringPredicate::matches(r"\w{1000}", &tiny),
            Err(ExprError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_input_length_limit() {
        let small = Limits {
            max_input_len: 3,
            ..limits()
        };
        let pred = StringPredicate::matches("a", &small).unwrap();
        assert!(pred.test("aaa").unwrap());
        assert!(matches!(pred.test("aaaa"), Err(ExprError::LimitExceeded { .. })));
    }

    #[test]
    fn test_replace_all_occurrences() {
        let t = StringTransform::replace("-", "_", &limits()).unwrap();
        assert_eq!(t.apply("a-b-c").unwrap(), "a_b_c");
    }

    #[test]
    fn test_replace_capture_group() {
        let t = StringTransform::replace(r"^env-(\w+)$", "$1", &limits()).unwrap();
        assert_eq!(t.apply("env-staging").unwrap(), "staging");
    }

    #[test]
    fn test_replace_non_matching_is_empty() {
        let t = StringTransform::replace("^devs$", "dev", &limits()).unwrap();
        assert_eq!(t.apply("env-qa").unwrap(), "");
        assert_eq!(t.apply("devs").unwrap(), "dev");
    }

    #[test]
    fn test_equals() {
        assert!(equals(&Value::scalar("a"), &Value::scalar("a")).unwrap());
        assert!(!equals(&Value::scalar("a"), &Value::scalar("b")).unwrap());
        assert!(equals(&Value::list(["a"]), &Value::scalar("a")).unwrap());
        assert!(equals(&Value::list(["a", "b"]), &Value::scalar("a")).is_err());
        assert!(equals(&Value::Bool(true), &Value::scalar("true")).is_err());
    }

    #[test]
    fn test_contains_list_membership() {
        let groups = Value::list(["devs", "qa"]);
        assert!(contains(&groups, &Value::scalar("devs")).unwrap());
        assert!(!contains(&groups, &Value::scalar("dev")).unwrap());
        assert!(!contains(&Value::List(vec![]), &Value::scalar("x")).unwrap());
    }

    #[test]
    fn test_contains_substring() {
        let email = Value::scalar("nic@example.com");
        assert!(contains(&email, &Value::scalar("@example")).unwrap());
        assert!(!contains(&email, &Value::scalar("@other")).unwrap());
    }

    #[test]
    fn test_contains_rejects_bool() {
        assert!(matches!(
            contains(&Value::Bool(true), &Value::scalar("t")),
            Err(ExprError::TypeMismatch { .. })
        ));
        assert!(contains(&Value::list(["a"]), &Value::Bool(true)).is_err());
    }
}
