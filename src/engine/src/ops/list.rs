//! List operators: `filter`, `transform`, `list`/`concat`

use crate::error::{ExprError, Result};
use crate::value::Value;

use super::{Operand, StringPredicate, StringTransform};

/// Keep the elements accepted by `predicate`, in order
///
/// The first predicate error aborts the whole operation.
pub fn filter(items: &[String], predicate: &StringPredicate) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for item in items {
        if predicate.test(item)? {
            out.push(item.clone());
        }
    }
    Ok(out)
}

/// Apply `transform` to every element; output has the input's length
pub fn transform(items: &[String], transform: &StringTransform) -> Result<Vec<String>> {
    items.iter().map(|item| transform.apply(item)).collect()
}

/// Flatten scalars and lists into one list, one level deep
///
/// Scalars are appended, lists are spliced in. Anything else is an
/// `InvalidArgument`. No arguments yields an empty list.
pub fn flatten(function: &str, args: Vec<Operand>) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for (position, arg) in args.into_iter().enumerate() {
        match arg {
            Operand::Value(Value::Scalar(s)) => out.push(s),
            Operand::Value(Value::List(items)) => out.extend(items),
            other => {
                return Err(ExprError::InvalidArgument {
                    function: function.to_string(),
                    reason: format!(
                        "argument {} must be a string or list, got {}",
                        position + 1,
                        other.kind()
                    ),
                })
            }
        }
    }
    Ok(out)
}
