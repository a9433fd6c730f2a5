//! Accessible shade derivation
//!
//! Given a background color, finds a text color that passes WCAG: either the
//! closest passing shade of the background itself (tinted mode, for designs
//! that want tone-on-tone text) or plain black/white. Derived colors are
//! memoized in the shared cache and each lookup outcome is reported to an
//! optional observer.
//!
//! The tinted search runs over whole-percent brightness shifts. Contrast is
//! monotone in the shift, so a binary search finds the smallest passing
//! shift in O(log 100) contrast checks per direction.

use std::sync::Arc;

use log::{debug, warn};

use crate::cache::{CacheValue, SharedCache};
use crate::color::Color;
use crate::events::{Event, EventSink};
use crate::theme::{self, Theme};
use crate::wcag::{ContrastEngine, WcagLevel};

/// Largest brightness shift the search will try, in whole percent
const MAX_SHIFT_PERCENT: i32 = 100;

/// Derives WCAG-passing text colors for a background
pub struct ShadeSearch {
    engine: ContrastEngine,
    observer: Option<Arc<dyn EventSink>>,
}

impl ShadeSearch {
    pub fn new(engine: ContrastEngine) -> Self {
        Self {
            engine,
            observer: None,
        }
    }

    /// Report cache hits and misses to `sink`.
    pub fn with_observer(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.observer = Some(sink);
        self
    }

    /// The contrast engine this search runs on
    pub fn engine(&self) -> &ContrastEngine {
        &self.engine
    }

    /// Handle to the shared cache
    pub fn cache(&self) -> SharedCache {
        self.engine.cache()
    }

    /// Text color for `background` at the given level.
    ///
    /// With `tint` the result is the closest passing shade of the background
    /// itself, falling back to the opposite direction and finally to
    /// black/white when no shade passes. Without `tint` it is simply
    /// whichever of black and white contrasts more.
    pub fn accessible_variant(
        &self,
        background: Color,
        tint: bool,
        level: WcagLevel,
        is_large_text: bool,
    ) -> Color {
        if tint {
            self.closest_shade(background, level, is_large_text)
        } else {
            self.cached_black_or_white(background, level, is_large_text)
        }
    }

    /// [`accessible_variant`](Self::accessible_variant) over a raw color
    /// string. Unparseable input resolves to black so callers always get a
    /// usable color.
    pub fn text_color(
        &self,
        input: &str,
        tint: bool,
        level: WcagLevel,
        is_large_text: bool,
    ) -> Color {
        match Color::parse(input) {
            Ok(background) => self.accessible_variant(background, tint, level, is_large_text),
            Err(err) => {
                debug!("text color fallback to black: {err}");
                Color::BLACK
            }
        }
    }

    /// Resolve a CSS value (possibly a `var()` reference) against a theme
    /// mode, then pick a black/white text color for it at AA, normal text.
    /// Unresolvable values degrade to black.
    pub fn text_color_for_theme(&self, css_value: &str, theme: &Theme, mode: &str) -> Color {
        let colors = theme.get(mode);
        let resolved = theme::extract_var_name(css_value)
            .and_then(|name| colors.and_then(|map| theme::resolve(name, map)))
            .unwrap_or(css_value);
        self.text_color(resolved, false, WcagLevel::Aa, false)
    }

    /// Whichever of black and white contrasts more with `background`.
    /// Ties go to black.
    pub fn black_or_white(&self, background: Color) -> Color {
        let black = self.engine.ratio(background, Color::BLACK);
        let white = self.engine.ratio(background, Color::WHITE);
        if black >= white {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    /// Compute a variant without consulting the derived-color cache. The
    /// batch processor does its own bulk cache round trip around this;
    /// ratio memoization inside the engine still applies.
    pub(crate) fn compute_variant(
        &self,
        background: Color,
        tint: bool,
        level: WcagLevel,
        is_large_text: bool,
    ) -> Color {
        if !tint {
            return self.black_or_white(background);
        }
        let lighten_first = is_dark(background);
        self.directed_search(background, lighten_first, level, is_large_text)
            .or_else(|| self.directed_search(background, !lighten_first, level, is_large_text))
            .unwrap_or_else(|| self.black_or_white(background))
    }

    fn closest_shade(&self, background: Color, level: WcagLevel, is_large_text: bool) -> Color {
        let key = shade_key(background, level, is_large_text);
        if let Some(color) = self.cached_color(&key) {
            return color;
        }

        let shade = self.compute_variant(background, true, level, is_large_text);
        self.store(&key, shade);
        shade
    }

    fn cached_black_or_white(
        &self,
        background: Color,
        level: WcagLevel,
        is_large_text: bool,
    ) -> Color {
        let key = bw_key(background, level, is_large_text);
        if let Some(color) = self.cached_color(&key) {
            return color;
        }

        let choice = self.compute_variant(background, false, level, is_large_text);
        self.store(&key, choice);
        choice
    }

    /// Binary search over brightness shifts in one direction. Returns the
    /// passing shade with the smallest shift, `None` when even the full
    /// shift fails.
    fn directed_search(
        &self,
        background: Color,
        lighten: bool,
        level: WcagLevel,
        is_large_text: bool,
    ) -> Option<Color> {
        let mut low = 0;
        let mut high = MAX_SHIFT_PERCENT;
        let mut closest = None;

        while low <= high {
            let mid = (low + high) / 2;
            let percent = if lighten { mid } else { -mid };
            let candidate = adjust_brightness(background, f64::from(percent) / 100.0);

            if self
                .engine
                .passes(candidate, background, level, is_large_text)
            {
                closest = Some(candidate);
                high = mid - 1;
            } else {
                low = mid + 1;
            }
        }

        closest
    }

    // Cache plumbing. Locks are scoped to single calls so contrast math and
    // observer callbacks never run under the mutex.

    fn cached_color(&self, key: &str) -> Option<Color> {
        let cached = self.cache().lock().unwrap().get(key);
        match cached.and_then(|value| value.as_color()) {
            Some(color) => {
                self.emit(|| Event::CacheHit {
                    key: key.to_string(),
                });
                Some(color)
            }
            None => {
                self.emit(|| Event::CacheMiss {
                    key: key.to_string(),
                });
                None
            }
        }
    }

    fn store(&self, key: &str, color: Color) {
        let result = self
            .cache()
            .lock()
            .unwrap()
            .set(key, CacheValue::Color(color), None);
        if let Err(err) = result {
            warn!("failed to cache {key}: {err}");
        }
    }

    /// Build and dispatch an event only when an observer is registered.
    fn emit(&self, event: impl FnOnce() -> Event) {
        if let Some(sink) = &self.observer {
            sink.emit(&event());
        }
    }
}

/// Cache key for a tinted-shade result
pub(crate) fn shade_key(background: Color, level: WcagLevel, is_large_text: bool) -> String {
    format!(
        "shade.{}-{}-{}",
        background.to_hex(),
        level,
        text_size(is_large_text)
    )
}

/// Cache key for a black/white result
pub(crate) fn bw_key(background: Color, level: WcagLevel, is_large_text: bool) -> String {
    format!(
        "bw.{}-{}-{}",
        background.to_hex(),
        level,
        text_size(is_large_text)
    )
}

fn text_size(is_large_text: bool) -> &'static str {
    if is_large_text {
        "large"
    } else {
        "normal"
    }
}

/// Shift brightness by `factor` of the full channel range: 1.0 lightens to
/// white, -1.0 darkens to black. Clamps before rounding so the cast stays
/// in range.
fn adjust_brightness(color: Color, factor: f64) -> Color {
    let shift = 255.0 * factor;
    let channel = |value: u8| (f64::from(value) + shift).clamp(0.0, 255.0).round() as u8;
    Color::new(channel(color.r), channel(color.g), channel(color.b))
}

/// Perceived-brightness check used only to pick the search direction. This
/// is the plain weighted channel sum, not the gamma-corrected luminance;
/// the two disagree on mid-range colors but the direction is a heuristic.
fn is_dark(color: Color) -> bool {
    let brightness = (0.2126 * f64::from(color.r)
        + 0.7152 * f64::from(color.g)
        + 0.0722 * f64::from(color.b))
        / 255.0;
    brightness < 0.5
}
