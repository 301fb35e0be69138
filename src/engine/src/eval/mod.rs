//! Tree-walking evaluator
//!
//! Evaluation is single-pass and stateless:
//!
//! - identifiers resolve through a [`TraitResolver`]
//! - call arguments are evaluated eagerly, depth-first, left to right
//! - `&&` and `||` evaluate the left operand first and skip the right one
//!   once the result is known
//!
//! # Example
//!
//! ```rust
//! use traitexpr_engine::{parse, Evaluator, TraitStore, Value};
//!
//! let traits = TraitStore::new().with_trait("username", ["my-username"]);
//! let expr = parse(r#"transform(external.username, replace("-", "_"))"#).unwrap();
//!
//! let value = Evaluator::default().evaluate(&expr, &traits).unwrap();
//! assert_eq!(value, Value::list(["my_username"]));
//! ```

use tracing::debug;

use crate::ast::Expr;
use crate::config::Limits;
use crate::error::{ExprError, Result};
use crate::ops::{self, MatchOption, Operand, StringPredicate, StringTransform};
use crate::registry::Builtin;
use crate::traits::TraitResolver;
use crate::value::Value;


/// Root of every identifier path
pub const EXTERNAL: &str = "external";

/// Stateless expression evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    limits: Limits,
}

impl Evaluator {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Evaluate `expr` against `traits`
    ///
    /// # Errors
    /// Any operator error aborts the evaluation. A result that is not a
    /// [`Value`] (a bare predicate, transform, option or trait mapping) is a
    /// `TypeMismatch`.
    pub fn evaluate(&self, expr: &Expr, traits: &dyn TraitResolver) -> Result<Value> {
        self.eval(expr, traits, 1)?.into_value("expression result")
    }

    fn eval(&self, expr: &Expr, traits: &dyn TraitResolver, depth: usize) -> Result<Operand> {
        if depth > self.limits.max_depth {
            return Err(ExprError::LimitExceeded {
                limit: "expression depth",
                max: self.limits.max_depth,
            });
        }

        match expr {
            Expr::Literal(s) => Ok(Operand::Value(Value::Scalar(s.clone()))),
            Expr::Ident(path) => resolve_identifier(path, traits),
            Expr::Index { target, key } => {
                let target = self.eval(target, traits, depth + 1)?;
                let key = self.eval(key, traits, depth + 1)?;
                let key = key.as_value("index key")?.as_scalar("index key")?;
                match target {
                    Operand::Traits => Ok(Operand::Value(Value::List(traits.resolve(key)))),
                    other => Err(ExprError::type_mismatch("index", "trait mapping", other.kind())),
                }
            }
            Expr::And(lhs, rhs) => {
                if !self.eval_bool(lhs, traits, depth, "&&")? {
                    return Ok(Operand::Value(Value::Bool(false)));
                }
                let rhs = self.eval_bool(rhs, traits, depth, "&&")?;
                Ok(Operand::Value(Value::Bool(rhs)))
            }
            Expr::Or(lhs, rhs) => {
                if self.eval_bool(lhs, traits, depth, "||")? {
                    return Ok(Operand::Value(Value::Bool(true)));
                }
                let rhs = self.eval_bool(rhs, traits, depth, "||")?;
                Ok(Operand::Value(Value::Bool(rhs)))
            }
            Expr::Not(inner) => {
                let value = self.eval_bool(inner, traits, depth, "!")?;
                Ok(Operand::Value(Value::Bool(!value)))
            }
            Expr::Call { name, args } => {
                let builtin = Builtin::from_name(name)?;
                builtin.check_arity(args.len())?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, traits, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                debug!("Applying {} with {} argument(s)", name, args.len());
                self.apply(builtin, name, args)
            }
        }
    }

    fn eval_bool(
        &self,
        expr: &Expr,
        traits: &dyn TraitResolver,
        depth: usize,
        context: &str,
    ) -> Result<bool> {
        self.eval(expr, traits, depth + 1)?
            .as_value(context)?
            .as_bool(context)
    }

    fn apply(&self, builtin: Builtin, name: &str, args: Vec<Operand>) -> Result<Operand> {
        let mut args = Args::new(builtin, args);

        let result: Operand = match builtin {
            Builtin::Equals => {
                let a = args.next()?;
                let b = args.next()?;
                Value::Bool(ops::equals(a.as_value(name)?, b.as_value(name)?)?).into()
            }
            Builtin::Contains => {
                let haystack = args.next()?;
                let needle = args.next()?;
                Value::Bool(ops::contains(haystack.as_value(name)?, needle.as_value(name)?)?)
                    .into()
            }
            Builtin::Matches => {
                let pattern = args.next()?;
                let pattern = pattern.as_value(name)?.as_scalar(name)?;
                Operand::Predicate(StringPredicate::matches(pattern, &self.limits)?)
            }
            Builtin::Replace => {
                let pattern = args.next()?;
                let replacement = args.next()?;
                Operand::Transform(StringTransform::replace(
                    pattern.as_value(name)?.as_scalar(name)?,
                    replacement.as_value(name)?.as_scalar(name)?,
                    &self.limits,
                )?)
            }
            Builtin::Filter => {
                let items = args.next()?;
                let items = items.as_value(name)?.as_list(name)?;
                match args.next()? {
                    Operand::Predicate(pred) => Value::List(ops::filter(items, &pred)?).into(),
                    other => return Err(ExprError::type_mismatch(name, "predicate", other.kind())),
                }
            }
            Builtin::Transform => {
                let items = args.next()?;
                let items = items.as_value(name)?.as_list(name)?;
                match args.next()? {
                    Operand::Transform(t) => Value::List(ops::transform(items, &t)?).into(),
                    other => return Err(ExprError::type_mismatch(name, "transform", other.kind())),
                }
            }
            Builtin::IfElse => {
                let condition = args.next()?.as_value(name)?.as_bool(name)?;
                let then_value = args.next()?.into_value(name)?;
                let else_value = args.next()?.into_value(name)?;
                ops::ifelse(condition, then_value, else_value)?.into()
            }
            Builtin::List => Value::List(ops::flatten(name, args.rest())?).into(),
            Builtin::Option => {
                let spec = args.next()?;
                let value = args.next()?.into_value(name)?;
                Operand::Option(MatchOption::new(spec, value)?)
            }
            Builtin::DefaultOption => {
                let value = args.next()?.into_value(name)?;
                Operand::Option(MatchOption::default_option(value)?)
            }
            Builtin::Match => {
                let input = args.next()?;
                // An absent trait (empty list) only selects a default option
                let input = match input.as_value(name)? {
                    Value::List(items) if items.is_empty() => None,
                    other => Some(other.as_scalar("match input")?),
                };
                let options = args
                    .rest()
                    .into_iter()
                    .map(|arg| match arg {
                        Operand::Option(option) => Ok(option),
                        other => Err(ExprError::type_mismatch(name, "option", other.kind())),
                    })
                    .collect::<Result<Vec<_>>>()?;
                ops::select(input, options)?.into()
            }
        };

        Ok(result)
    }
}

/// Positional argument cursor for one builtin call
struct Args {
    builtin: Builtin,
    total: usize,
    iter: std::vec::IntoIter<Operand>,
}

impl Args {
    fn new(builtin: Builtin, args: Vec<Operand>) -> Self {
        Self {
            builtin,
            total: args.len(),
            iter: args.into_iter(),
        }
    }

    fn next(&mut self) -> Result<Operand> {
        self.iter.next().ok_or_else(|| ExprError::ArityMismatch {
            function: self.builtin.name(),
            expected: self.builtin.arity().to_string(),
            actual: self.total,
        })
    }

    fn rest(self) -> Vec<Operand> {
        self.iter.collect()
    }
}

/// Resolve `external` or `external.<name>`
///
/// An unbound trait name resolves to an empty list.
pub fn resolve_identifier(path: &[String], traits: &dyn TraitResolver) -> Result<Operand> {
    match path {
        [root] if root == EXTERNAL => Ok(Operand::Traits),
        [root, name] if root == EXTERNAL => Ok(Operand::Value(Value::List(traits.resolve(name)))),
        _ => Err(ExprError::UnboundIdentifier(path.join("."))),
    }
}

/// Evaluate with default limits
pub fn evaluate(expr: &Expr, traits: &dyn TraitResolver) -> Result<Value> {
    Evaluator::default().evaluate(expr, traits)
}
