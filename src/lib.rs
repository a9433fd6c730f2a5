//! WCAG Contrast Library
//!
//! A library for checking and repairing text/background color combinations
//! against the WCAG 2.x contrast success criteria, with a pluggable cache
//! so repeated palette work stays cheap.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`color`] - Color parsing (hex, `rgb()`, `hsl()`, named palette) and
//!   the canonical `#rrggbb` form
//! - [`wcag`] - Relative luminance, contrast ratios, and the pass/fail
//!   rules per conformance level
//! - [`shade`] - Binary search for the nearest accessible shade of a color
//! - [`batch`] - Bulk resolution of labeled color sets with one cache
//!   round trip
//! - [`cache`] - Cache trait plus memory, file, and null backends
//! - [`config`] - TOML configuration for picking and sizing a backend
//! - [`events`] - Observer hook for cache hits, misses, and batch summaries
//! - [`theme`] - Helpers for `var(--name)` indirection in theme maps
//!
//! # Example Usage
//!
//! ```rust
//! use a11y_contrast::{cache, contrast_ratio, Color, ContrastEngine, MemoryCache,
//!                     ShadeSearch, WcagLevel};
//!
//! let engine = ContrastEngine::new(cache::shared(MemoryCache::new()));
//! let search = ShadeSearch::new(engine);
//!
//! // Pick a readable text color for a dark panel.
//! let background = Color::parse("slate-800").unwrap();
//! let text = search.accessible_variant(background, false, WcagLevel::Aa, false);
//! assert_eq!(text, Color::WHITE);
//!
//! // Or stay on brand and shift the panel color itself.
//! let tinted = search.accessible_variant(background, true, WcagLevel::Aa, false);
//! assert!(contrast_ratio(tinted, background) >= 4.5);
//! ```
//!
//! # Batch Resolution
//!
//! Whole palettes resolve in one pass, sharing a single bulk cache read
//! and write:
//!
//! ```rust
//! use a11y_contrast::{cache, BatchProcessor, ContrastEngine, MemoryCache,
//!                     ShadeSearch, WcagLevel};
//!
//! let search = ShadeSearch::new(ContrastEngine::new(cache::shared(MemoryCache::new())));
//! let processor = BatchProcessor::new(search);
//!
//! let palette = [("header", "#1e293b"), ("accent", "blue-500")];
//! for (name, color) in processor.resolve_many(&palette, false, WcagLevel::Aa, false) {
//!     println!("{name}: {color}");
//! }
//! ```
//!
//! # Persistent Caching
//!
//! Results survive the process when the file backend is configured:
//!
//! ```rust,no_run
//! use a11y_contrast::{cache, Config, ContrastEngine, ShadeSearch};
//!
//! let config = Config::load_default().unwrap();
//! let engine = ContrastEngine::new(cache::from_settings(&config.cache).unwrap());
//! let search = ShadeSearch::new(engine);
//! ```
//!
//! # Features
//!
//! - **WCAG 2.x Math** - Relative luminance and contrast ratios as the
//!   success criteria define them
//! - **Shade Search** - Finds the smallest brightness shift that reaches
//!   a conformance level, with black/white as the last resort
//! - **Pluggable Caching** - Bounded in-memory, sharded on-disk, or null
//!   backends behind one trait
//! - **Batch Processing** - Deduplicated bulk resolution with hit/miss
//!   accounting
//! - **Theme Indirection** - Resolves `var(--name)` references through
//!   per-mode theme maps

pub mod batch;
pub mod cache;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod shade;
pub mod theme;
pub mod wcag;

pub use batch::BatchProcessor;
pub use cache::{Cache, CacheStats, CacheValue, FileCache, MemoryCache, NullCache, SharedCache};
pub use color::Color;
pub use config::{CacheSettings, Config, ConfigError};
pub use error::{CacheError, ColorError};
pub use events::{Event, EventSink};
pub use shade::ShadeSearch;
pub use theme::{Theme, ThemeColors};
pub use wcag::{contrast_ratio, passes_wcag, relative_luminance, ContrastEngine, WcagLevel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
