//! Observer events for cache activity and batch completion
//!
//! Consumers that want visibility into cache behavior register an
//! [`EventSink`] on the components that accept one. Sinks are invoked
//! synchronously at the point the outcome is known; when no sink is
//! registered the only cost is an `Option` check.

use std::time::Duration;

/// A notification emitted while resolving colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A derived-color lookup was answered from the cache
    CacheHit { key: String },

    /// A derived-color lookup missed the cache and had to be computed
    CacheMiss { key: String },

    /// A batch finished resolving
    BatchCompleted {
        /// Number of input entries, including unparseable ones
        total: usize,
        /// Entries answered from the cache
        hits: usize,
        /// Entries computed during this batch
        misses: usize,
        /// Wall-clock time for the whole batch
        duration: Duration,
    },
}

/// Receiver for [`Event`]s.
///
/// Implementations must be cheap and non-blocking; they run inline on the
/// caller's thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<Event>>);

    impl EventSink for Recorder {
        fn emit(&self, event: &Event) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_sink_receives_events() {
        let sink = Recorder(Mutex::new(Vec::new()));
        sink.emit(&Event::CacheMiss {
            key: "shade.#3b82f6-AA-normal".to_string(),
        });
        sink.emit(&Event::CacheHit {
            key: "shade.#3b82f6-AA-normal".to_string(),
        });

        let seen = sink.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], Event::CacheMiss { .. }));
        assert!(matches!(seen[1], Event::CacheHit { .. }));
    }
}
