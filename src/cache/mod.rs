//! Pluggable memoization caches
//!
//! Derived colors and contrast ratios are memoized through the [`Cache`]
//! trait. Three backends ship with the library: a bounded in-memory FIFO
//! map, a filesystem tree of JSON entries, and a null cache for callers that
//! want memoization off. Components share one backend through a
//! [`SharedCache`] handle.
//!
//! # Submodules
//!
//! - `memory` - Bounded FIFO in-memory backend
//! - `file` - One-JSON-file-per-entry filesystem backend
//! - `null` - No-op backend that never stores anything
//!
//! Backends never evict on read: `get` and `has` leave insertion order
//! untouched, so a busy key ages out at the same rate as an idle one.

pub mod file;
pub mod memory;
pub mod null;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use null::NullCache;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::CacheSettings;
use crate::error::{CacheError, Result};

/// A value a cache can hold: a contrast ratio or a resolved color.
///
/// Serialized without a tag, so file-cache entries read as plain JSON
/// (`4.54` or `"#757575"`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    Ratio(f64),
    Color(Color),
}

impl CacheValue {
    pub fn as_ratio(&self) -> Option<f64> {
        match self {
            CacheValue::Ratio(ratio) => Some(*ratio),
            CacheValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            CacheValue::Ratio(_) => None,
            CacheValue::Color(color) => Some(*color),
        }
    }
}

/// Lookup counters, maintained by each backend.
///
/// Only `get` moves these: a `has` probe or a `set` is neither a hit nor
/// a miss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache, 0.0 when nothing has
    /// been looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Storage interface shared by all backends.
///
/// `ttl` is a hint: backends without expiry (memory, null) ignore it.
pub trait Cache: Send {
    /// Fetch a value. Counts a hit or a miss.
    fn get(&mut self, key: &str) -> Option<CacheValue>;

    /// Store a value, replacing any existing entry under the same key.
    fn set(&mut self, key: &str, value: CacheValue, ttl: Option<Duration>) -> Result<()>;

    /// Existence probe. Does not touch the hit/miss counters.
    fn has(&mut self, key: &str) -> bool;

    /// Remove a single entry. Removing a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Drop every entry and reset the counters.
    fn clear(&mut self) -> Result<()>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Current hit/miss counters.
    fn stats(&self) -> CacheStats;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch several keys in one call. The result lines up with `keys`.
    fn get_multiple(&mut self, keys: &[String]) -> Vec<Option<CacheValue>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Store several entries. Keeps going past individual failures and
    /// reports the first error afterwards.
    fn set_multiple(&mut self, entries: &[(String, CacheValue)], ttl: Option<Duration>) -> Result<()> {
        let mut first_err = None;
        for (key, value) in entries {
            if let Err(err) = self.set(key, *value, ttl) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Remove several entries, same error handling as [`set_multiple`](Cache::set_multiple).
    fn delete_multiple(&mut self, keys: &[String]) -> Result<()> {
        let mut first_err = None;
        for key in keys {
            if let Err(err) = self.delete(key) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Shared handle to a cache backend.
///
/// The engine, the shade search, and the batch processor all hold clones of
/// one handle; the mutex keeps read-modify-write sequences atomic.
pub type SharedCache = Arc<Mutex<dyn Cache>>;

/// Wrap a backend in a [`SharedCache`] handle.
pub fn shared<C>(backend: C) -> SharedCache
where
    C: Cache + 'static,
{
    Arc::new(Mutex::new(backend))
}

/// Build a backend from configuration.
///
/// Recognized backends are `memory`, `file`, and `null`; anything else is
/// [`CacheError::UnsupportedDriver`].
pub fn from_settings(settings: &CacheSettings) -> Result<SharedCache> {
    match settings.backend.as_str() {
        "memory" => {
            info!("using memory cache (limit {})", settings.limit);
            Ok(shared(MemoryCache::with_limit(settings.limit)))
        }
        "file" => {
            info!("using file cache at {}", settings.path.display());
            let mut backend = FileCache::new(&settings.path)?;
            if let Some(secs) = settings.ttl_secs {
                backend = backend.with_default_ttl(Duration::from_secs(secs));
            }
            Ok(shared(backend))
        }
        "null" => {
            info!("caching disabled (null backend)");
            Ok(shared(NullCache::new()))
        }
        other => Err(CacheError::UnsupportedDriver(other.to_string())),
    }
}
