//! Bounded in-memory cache
//!
//! A `HashMap` paired with an insertion-order queue. When the map is full
//! the oldest entry is evicted, FIFO: reads never refresh an entry's
//! position, and overwriting an existing key keeps its original slot in
//! the queue.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use log::debug;

use super::{Cache, CacheStats, CacheValue};
use crate::error::Result;

/// Default entry limit for [`MemoryCache::new`]
pub const DEFAULT_LIMIT: usize = 1000;

/// Bounded FIFO map backend
pub struct MemoryCache {
    storage: HashMap<String, CacheValue>,
    order: VecDeque<String>,
    limit: usize,
    stats: CacheStats,
}

impl MemoryCache {
    /// Cache holding up to [`DEFAULT_LIMIT`] entries
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// Cache holding up to `limit` entries
    pub fn with_limit(limit: usize) -> Self {
        Self {
            storage: HashMap::new(),
            order: VecDeque::new(),
            limit,
            stats: CacheStats::default(),
        }
    }

    /// Configured entry limit
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache for MemoryCache {
    fn get(&mut self, key: &str) -> Option<CacheValue> {
        match self.storage.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(*value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: CacheValue, _ttl: Option<Duration>) -> Result<()> {
        if let Some(existing) = self.storage.get_mut(key) {
            // Overwrite in place; the key keeps its slot in the queue.
            *existing = value;
            return Ok(());
        }

        if self.storage.len() >= self.limit {
            if let Some(oldest) = self.order.pop_front() {
                debug!("memory cache full, evicting '{oldest}'");
                self.storage.remove(&oldest);
            }
        }

        self.storage.insert(key.to_string(), value);
        self.order.push_back(key.to_string());
        Ok(())
    }

    fn has(&mut self, key: &str) -> bool {
        self.storage.contains_key(key)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.storage.remove(key).is_some() {
            self.order.retain(|queued| queued != key);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.storage.clear();
        self.order.clear();
        self.stats = CacheStats::default();
        Ok(())
    }

    fn len(&self) -> usize {
        self.storage.len()
    }

    fn stats(&self) -> CacheStats {
        self.stats
    }
}
