//! Null cache backend
//!
//! Stores nothing and misses every lookup. Useful for benchmarking raw
//! computation and for callers that must not persist anything.

use std::time::Duration;

use super::{Cache, CacheStats, CacheValue};
use crate::error::Result;

/// Backend that never stores anything
#[derive(Debug, Default)]
pub struct NullCache {
    stats: CacheStats,
}

impl NullCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for NullCache {
    fn get(&mut self, _key: &str) -> Option<CacheValue> {
        self.stats.misses += 1;
        None
    }

    fn set(&mut self, _key: &str, _value: CacheValue, _ttl: Option<Duration>) -> Result<()> {
        Ok(())
    }

    fn has(&mut self, _key: &str) -> bool {
        false
    }

    fn delete(&mut self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.stats = CacheStats::default();
        Ok(())
    }

    fn len(&self) -> usize {
        0
    }

    fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_stores() {
        let mut cache = NullCache::new();
        cache.set("k", CacheValue::Ratio(1.0), None).unwrap();

        assert_eq!(cache.get("k"), None);
        assert!(!cache.has("k"));
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_every_get_is_a_miss() {
        let mut cache = NullCache::new();
        cache.set("k", CacheValue::Ratio(1.0), None).unwrap();

        cache.get("k");
        cache.get("k");

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_maintenance_ops_are_noops() {
        let mut cache = NullCache::new();
        cache.delete("k").unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
