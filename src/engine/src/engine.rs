//! Trait expression engine with parsed expression caching

use std::sync::Arc;
use tracing::{debug, info};

use crate::ast::Expr;
use crate::cache::{CacheStats, ExpressionCache};
use crate::config::EngineConfig;
use crate::error::{ExprError, Result};
use crate::eval::Evaluator;
use crate::parser::parse_with_config;
use crate::traits::TraitResolver;
use crate::value::Value;

/// Engine for compiling and evaluating trait expressions
///
/// Shareable across threads: the cache is a `DashMap` and evaluation holds
/// no mutable state.
pub struct Engine {
    config: EngineConfig,
    evaluator: Evaluator,
    /// Parsed expression cache (thread-safe)
    cache: Option<ExpressionCache>,
}

impl Engine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// Create an engine with a custom configuration
    ///
    /// # Errors
    /// Returns error if the configuration fails validation
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let cache = config
            .enable_cache
            .then(|| ExpressionCache::new(config.cache_capacity));
        info!(
            "Trait expression engine initialized with cache={}, max_depth={}",
            config.enable_cache, config.max_depth
        );
        Self {
            evaluator: Evaluator::new(config.limits()),
            config,
            cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse an expression, reusing a cached tree when available
    ///
    /// # Errors
    /// Returns error if the expression cannot be parsed or exceeds limits
    pub fn compile(&self, src: &str) -> Result<Arc<Expr>> {
        if let Some(cache) = &self.cache {
            if let Some(expr) = cache.get(src) {
                return Ok(expr);
            }
        }

        let expr = Arc::new(parse_with_config(src, &self.config)?);
        debug!("Compiled expression of depth {}", expr.depth());

        if let Some(cache) = &self.cache {
            cache.put(src, expr.clone());
        }
        Ok(expr)
    }

    /// Evaluate an already parsed expression
    pub fn evaluate(&self, expr: &Expr, traits: &dyn TraitResolver) -> Result<Value> {
        self.evaluator.evaluate(expr, traits)
    }

    /// Compile and evaluate an expression in one call
    pub fn evaluate_expression(&self, src: &str, traits: &dyn TraitResolver) -> Result<Value> {
        let expr = self.compile(src)?;
        self.evaluate(&expr, traits)
    }

    /// Evaluate an expression that must produce a boolean decision
    ///
    /// Whether an error denies access is left to the caller.
    pub fn check(&self, src: &str, traits: &dyn TraitResolver) -> Result<bool> {
        match self.evaluate_expression(src, traits)? {
            Value::Bool(b) => Ok(b),
            other => Err(ExprError::type_mismatch("decision", "bool", other.kind())),
        }
    }

    /// Clear the parsed expression cache
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
            info!("Expression cache cleared");
        }
    }

    /// Get cache statistics; all zero when caching is disabled
    pub fn cache_stats(&self) -> CacheStats {
        match &self.cache {
            Some(cache) => cache.stats(),
            None => CacheStats {
                entries: 0,
                capacity: 0,
                hits: 0,
                misses: 0,
            },
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
