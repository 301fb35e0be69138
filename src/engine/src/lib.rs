//! # traitexpr engine
//!
//! Evaluates identity-trait expressions into policy values for access-control
//! templating: a login name, a set of allowed groups, or a boolean decision
//! derived from a user's external traits.
//!
//! ## Features
//!
//! - **Closed value model**: strings, string lists and booleans
//! - **Builtins**: `equals`, `contains`, `matches`, `filter`, `transform`,
//!   `replace`, `ifelse`, `list`/`concat`, `option`, `default_option`, `match`
//! - **Short-circuit** `&&`, `||` and `!`
//! - **Bounded evaluation**: depth, expression size and regex limits
//! - **Parsed expression cache** keyed by BLAKE3 hash
//!
//! ## Example
//!
//! ```rust
//! use traitexpr_engine::{Engine, TraitStore, Value};
//!
//! let traits = TraitStore::new()
//!     .with_trait("groups", ["env-staging", "env-qa", "devs"]);
//!
//! let engine = Engine::new();
//! let logins = engine.evaluate_expression(
//!     r#"transform(filter(external.groups, matches("^env-\\w+$")), replace("^env-(\\w+)$", "$1"))"#,
//!     &traits,
//! ).unwrap();
//!
//! assert_eq!(logins, Value::list(["staging", "qa"]));
//! ```

pub mod ast;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod ops;
pub mod parser;
pub mod registry;
pub mod traits;
pub mod value;

// Re-export commonly used types
pub use ast::Expr;
pub use cache::CacheStats;
pub use config::{EngineConfig, Limits};
pub use engine::Engine;
pub use error::{ExprError, Result};
pub use eval::{evaluate, Evaluator};
pub use parser::{parse, parse_with_config};
pub use registry::Builtin;
pub use traits::{TraitMap, TraitResolver, TraitStore};
pub use value::Value;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
