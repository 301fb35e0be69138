//! Engine configuration and evaluation limits

use serde::{Deserialize, Serialize};

use crate::error::{ExprError, Result};

/// Engine configuration
///
/// Trait values may be attacker-influenced, so every evaluation runs under
/// bounded depth, expression size and regex input size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting depth of an expression tree
    pub max_depth: usize,

    /// Maximum length in bytes of expression source
    pub max_expression_len: usize,

    /// Compiled regex size limit in bytes
    pub max_regex_size: usize,

    /// Maximum length of a string handed to `matches` or `replace`
    pub max_input_len: usize,

    /// Cache parsed expressions
    pub enable_cache: bool,

    /// Maximum number of cached expressions
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_expression_len: 16 * 1024,
            max_regex_size: 1024 * 1024,
            max_input_len: 64 * 1024,
            enable_cache: true,
            cache_capacity: 1000,
        }
    }
}

impl EngineConfig {
    /// Reject configurations that would disable evaluation entirely
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("max_depth", self.max_depth),
            ("max_expression_len", self.max_expression_len),
            ("max_regex_size", self.max_regex_size),
            ("max_input_len", self.max_input_len),
        ];
        for (name, value) in bounds {
            if value == 0 {
                return Err(ExprError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        if self.enable_cache && self.cache_capacity == 0 {
            return Err(ExprError::InvalidConfig(
                "cache_capacity must be greater than zero when caching".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-evaluation bounds derived from this configuration
    pub fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_depth,
            max_regex_size: self.max_regex_size,
            max_input_len: self.max_input_len,
        }
    }
}

/// Bounds enforced while evaluating a single expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_depth: usize,
    pub max_regex_size: usize,
    pub max_input_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        EngineConfig::default().limits()
    }
}
