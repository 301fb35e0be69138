//! Parsed expression cache

use blake3::Hasher;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use crate::ast::Expr;

/// Cache key type (BLAKE3 hash of the expression source)
type CacheKey = [u8; 32];

#[derive(Clone)]
struct CachedEntry {
    expr: Arc<Expr>,
    cached_at: Instant,
}

/// Thread-safe cache of parsed expressions
///
/// Keys are BLAKE3 hashes of the source text, so long expressions do not
/// inflate the key space. When full, roughly the oldest tenth is evicted.
pub struct ExpressionCache {
    entries: DashMap<CacheKey, CachedEntry>,
    capacity: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ExpressionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Look up a previously parsed expression
    pub fn get(&self, src: &str) -> Option<Arc<Expr>> {
        let key = Self::compute_key(src);
        match self.entries.get(&key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!("Expression cache hit");
                Some(entry.expr.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a parsed expression
    pub fn put(&self, src: &str, expr: Arc<Expr>) {
        if self.capacity == 0 {
            return;
        }

        let key = Self::compute_key(src);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        self.entries.insert(
            key,
            CachedEntry {
                expr,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn compute_key(src: &str) -> CacheKey {
        let mut hasher = Hasher::new();
        hasher.update(src.as_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Remove about 10% of entries, oldest first
    fn evict_oldest(&self) {
        let to_remove = (self.capacity / 10).max(1);

        let mut ages: Vec<(CacheKey, Instant)> = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().cached_at))
            .collect();
        ages.sort_by_key(|(_, cached_at)| *cached_at);

        for (key, _) in ages.into_iter().take(to_remove) {
            self.entries.remove(&key);
        }
        debug!("Evicted {} cached expression(s)", to_remove);
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached expressions
    pub entries: usize,
    /// Maximum number of cached expressions
    pub capacity: usize,
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
