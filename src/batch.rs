//! Batch resolution
//!
//! Resolves many labeled background colors in one pass with a single bulk
//! cache read and a single bulk cache write, instead of one cache round
//! trip per entry. Large palettes and theme sweeps go through here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};

use crate::cache::{CacheValue, SharedCache};
use crate::color::Color;
use crate::events::{Event, EventSink};
use crate::shade::{self, ShadeSearch};
use crate::wcag::WcagLevel;

/// Resolves sets of background colors against one shared cache
pub struct BatchProcessor {
    search: ShadeSearch,
    observer: Option<Arc<dyn EventSink>>,
}

impl BatchProcessor {
    pub fn new(search: ShadeSearch) -> Self {
        Self {
            search,
            observer: None,
        }
    }

    /// Report per-key cache outcomes and batch completion to `sink`.
    pub fn with_observer(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.observer = Some(sink);
        self
    }

    /// The shade search this processor computes misses with
    pub fn search(&self) -> &ShadeSearch {
        &self.search
    }

    /// Handle to the shared cache
    pub fn cache(&self) -> SharedCache {
        self.search.cache()
    }

    /// Resolve text colors for a labeled set of backgrounds.
    ///
    /// The output lines up with the input: one `(key, color)` pair per
    /// entry, in the same order. Entries whose color string fails to parse
    /// resolve to black. A color shared by several entries is fetched and
    /// computed once and every entry carrying it gets the result.
    pub fn resolve_many<K, V>(
        &self,
        backgrounds: &[(K, V)],
        tint: bool,
        level: WcagLevel,
        is_large_text: bool,
    ) -> Vec<(String, Color)>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if backgrounds.is_empty() {
            return Vec::new();
        }
        let started = Instant::now();

        // Normalize everything up front. Unparseable entries carry no
        // cache key and fall through to the black fallback at the end.
        let items: Vec<(String, Option<Color>)> = backgrounds
            .iter()
            .map(|(key, value)| {
                let parsed = match Color::parse(value.as_ref()) {
                    Ok(color) => Some(color),
                    Err(err) => {
                        debug!("batch entry '{}' unusable: {err}", key.as_ref());
                        None
                    }
                };
                (key.as_ref().to_string(), parsed)
            })
            .collect();

        // One fetch per distinct cache key, in first-seen order.
        let mut cache_keys: Vec<String> = Vec::new();
        let mut bases: Vec<Color> = Vec::new();
        let mut seen = HashSet::new();
        for (_, parsed) in &items {
            if let Some(background) = parsed {
                let key = derive_key(*background, tint, level, is_large_text);
                if seen.insert(key.clone()) {
                    cache_keys.push(key);
                    bases.push(*background);
                }
            }
        }

        let fetched = self.cache().lock().unwrap().get_multiple(&cache_keys);

        // Compute the misses outside the lock; the contrast engine takes it
        // per ratio lookup as needed.
        let mut resolved: HashMap<String, Color> = HashMap::new();
        let mut computed: Vec<(String, CacheValue)> = Vec::new();
        let mut hits = 0;
        let mut misses = 0;

        for ((key, background), value) in cache_keys.iter().zip(bases.iter()).zip(fetched) {
            match value.and_then(|value| value.as_color()) {
                Some(color) => {
                    hits += 1;
                    self.emit(|| Event::CacheHit { key: key.clone() });
                    resolved.insert(key.clone(), color);
                }
                None => {
                    misses += 1;
                    self.emit(|| Event::CacheMiss { key: key.clone() });
                    let color =
                        self.search
                            .compute_variant(*background, tint, level, is_large_text);
                    resolved.insert(key.clone(), color);
                    computed.push((key.clone(), CacheValue::Color(color)));
                }
            }
        }

        if !computed.is_empty() {
            let stored = self.cache().lock().unwrap().set_multiple(&computed, None);
            if let Err(err) = stored {
                warn!("failed to store {} batch entries: {err}", computed.len());
            }
        }

        // Reassemble in input order.
        let results: Vec<(String, Color)> = items
            .into_iter()
            .map(|(key, parsed)| {
                let color = parsed
                    .map(|background| derive_key(background, tint, level, is_large_text))
                    .and_then(|cache_key| resolved.get(&cache_key).copied())
                    .unwrap_or(Color::BLACK);
                (key, color)
            })
            .collect();

        let duration = started.elapsed();
        debug!(
            "batch resolved {} colors ({hits} hits, {misses} misses) in {duration:?}",
            results.len()
        );
        self.emit(|| Event::BatchCompleted {
            total: results.len(),
            hits,
            misses,
            duration,
        });

        results
    }

    /// Build and dispatch an event only when an observer is registered.
    fn emit(&self, event: impl FnOnce() -> Event) {
        if let Some(sink) = &self.observer {
            sink.emit(&event());
        }
    }
}

fn derive_key(background: Color, tint: bool, level: WcagLevel, is_large_text: bool) -> String {
    if tint {
        shade::shade_key(background, level, is_large_text)
    } else {
        shade::bw_key(background, level, is_large_text)
    }
}
