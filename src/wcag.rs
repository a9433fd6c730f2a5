//! WCAG 2.x contrast math and conformance checks
//!
//! Implements relative luminance and contrast ratio exactly as the WCAG 2.x
//! success criteria define them, plus the fixed threshold table for the AA,
//! AAA, and non-text levels. `ContrastEngine` wraps the pure functions with
//! a shared memoization cache for callers that compare the same pairs
//! repeatedly.

use std::fmt;
use std::sync::Arc;

use log::{trace, warn};

use crate::cache::{CacheValue, SharedCache};
use crate::color::Color;

/// WCAG conformance level to check against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WcagLevel {
    /// Level AA text contrast (4.5:1, or 3:1 for large text)
    Aa,
    /// Level AAA text contrast (7:1, or 4.5:1 for large text)
    Aaa,
    /// Non-text contrast for UI components and graphics (3:1)
    NonText,
}

impl WcagLevel {
    /// Minimum contrast ratio required by this level.
    ///
    /// The non-text criterion has a single threshold, so `is_large_text`
    /// is ignored for it.
    pub fn threshold(self, is_large_text: bool) -> f64 {
        match (self, is_large_text) {
            (WcagLevel::Aa, false) => 4.5,
            (WcagLevel::Aa, true) => 3.0,
            (WcagLevel::Aaa, false) => 7.0,
            (WcagLevel::Aaa, true) => 4.5,
            (WcagLevel::NonText, _) => 3.0,
        }
    }
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WcagLevel::Aa => "AA",
            WcagLevel::Aaa => "AAA",
            WcagLevel::NonText => "non-text",
        };
        f.write_str(name)
    }
}

/// Relative luminance of a color per WCAG 2.x, in `[0.0, 1.0]`.
///
/// Black is 0.0 and white is 1.0.
pub fn relative_luminance(color: Color) -> f64 {
    0.2126 * srgb_to_linear(color.r)
        + 0.7152 * srgb_to_linear(color.g)
        + 0.0722 * srgb_to_linear(color.b)
}

/// WCAG 2.x sRGB linearization. The 0.03928 cutoff is the value written
/// into the success criteria, not the 0.04045 from IEC 61966; conformance
/// checks must reproduce the published math.
fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Contrast ratio between two colors, in `[1.0, 21.0]`.
///
/// Symmetric in its arguments: the lighter color always goes on top.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (darker, lighter) = if la < lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Check a color pair against a WCAG level. Ratios exactly at the
/// threshold pass.
pub fn passes_wcag(
    foreground: Color,
    background: Color,
    level: WcagLevel,
    is_large_text: bool,
) -> bool {
    contrast_ratio(foreground, background) >= level.threshold(is_large_text)
}

/// Contrast checker that memoizes ratios in a shared cache.
///
/// Ratios are stored under a symmetric key, so `ratio(a, b)` and
/// `ratio(b, a)` share one entry. A failed cache write is logged and the
/// freshly computed ratio is returned anyway.
#[derive(Clone)]
pub struct ContrastEngine {
    cache: SharedCache,
}

impl ContrastEngine {
    /// Create an engine memoizing into the given cache.
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    /// Handle to the cache this engine memoizes into.
    pub fn cache(&self) -> SharedCache {
        Arc::clone(&self.cache)
    }

    /// Memoized [`contrast_ratio`].
    pub fn ratio(&self, a: Color, b: Color) -> f64 {
        let key = ratio_key(a, b);
        let mut cache = self.cache.lock().unwrap();

        if let Some(ratio) = cache.get(&key).and_then(|value| value.as_ratio()) {
            trace!("contrast memo hit for {key}");
            return ratio;
        }
        trace!("contrast memo miss for {key}");

        let ratio = contrast_ratio(a, b);
        if let Err(err) = cache.set(&key, CacheValue::Ratio(ratio), None) {
            warn!("failed to memoize {key}: {err}");
        }
        ratio
    }

    /// Memoized [`passes_wcag`].
    pub fn passes(
        &self,
        foreground: Color,
        background: Color,
        level: WcagLevel,
        is_large_text: bool,
    ) -> bool {
        self.ratio(foreground, background) >= level.threshold(is_large_text)
    }
}

/// Cache key for a color pair. Hex forms are sorted so the key is symmetric.
fn ratio_key(a: Color, b: Color) -> String {
    let (a, b) = (a.to_hex(), b.to_hex());
    let (lo, hi) = if a <= b { (&a, &b) } else { (&b, &a) };
    format!("ratio.{lo}-{hi}")
}
