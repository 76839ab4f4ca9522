//! # Text Fitting
//!
//! Measurement, greedy word wrap, and font-size search for label fields.
//!
//! All measurement goes through the pass's shape cache, so a width is the
//! sum of shaped glyph advances (Arabic contextual forms included when an
//! embedded font is loaded). Widths scale linearly with size, which is what
//! makes the size search well behaved: a smaller size never needs more
//! lines than a larger one.

pub mod bidi;
pub mod shaping;

use std::rc::Rc;

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::{FontContext, Weight};
use shaping::{GlyphRun, ShapeCache};

/// Granularity of the size search, in points.
pub const SIZE_STEP: f64 = 0.25;

/// The outcome of fitting a string into a box.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub size: f64,
    pub lines: Vec<String>,
}

/// Measures, wraps, and sizes text against one font family.
///
/// Owns the shaping memo for a render pass; drop it with the pass.
#[derive(Debug)]
pub struct TextFitter<'a> {
    fonts: &'a FontContext,
    cache: ShapeCache,
}

impl<'a> TextFitter<'a> {
    pub fn new(fonts: &'a FontContext) -> Self {
        Self {
            fonts,
            cache: ShapeCache::new(),
        }
    }

    pub fn fonts(&self) -> &'a FontContext {
        self.fonts
    }

    pub fn cache(&self) -> &ShapeCache {
        &self.cache
    }

    /// The display-ready glyph run for `text`.
    pub fn shape(&self, text: &str, weight: Weight) -> Rc<GlyphRun> {
        let resolved = self.fonts.resolve(weight);
        self.cache.get_or_shape(text, resolved.slot, resolved.face)
    }

    /// Sum of glyph advances at `size` points.
    pub fn measure_width(&self, text: &str, weight: Weight, size: f64) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        self.shape(text, weight).width(size)
    }

    /// Greedy word wrap.
    ///
    /// A line takes segments while its measured width stays within
    /// `max_width`. A segment wider than `max_width` gets a line of its own
    /// and is never split. Explicit newlines always end a line. Trailing
    /// whitespace is not part of a line.
    pub fn wrap_to_width(&self, text: &str, weight: Weight, size: f64, max_width: f64) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return vec![];
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut start = 0;

        for (end, opportunity) in linebreaks(text) {
            let segment = &text[start..end];
            start = end;

            let candidate = format!("{}{}", current, segment);
            let fits = self.measure_width(candidate.trim_end(), weight, size) <= max_width;
            if fits || current.trim_end().is_empty() {
                current = candidate;
            } else {
                lines.push(current.trim_end().to_string());
                current = segment.to_string();
            }

            if opportunity == BreakOpportunity::Mandatory {
                lines.push(current.trim_end().to_string());
                current.clear();
            }
        }

        if !current.trim_end().is_empty() {
            lines.push(current.trim_end().to_string());
        }
        lines
    }

    /// Largest size in `[min_size, max_size]` at which `text` wraps into at
    /// most `max_lines` lines of `max_width`.
    ///
    /// `max_size` is tried first; after that the search runs over the
    /// 0.25pt lattice anchored at `min_size`. If even `min_size` needs too
    /// many lines, `min_size` is returned with its overflowing lines.
    pub fn fit_lines(
        &self,
        text: &str,
        weight: Weight,
        max_size: f64,
        min_size: f64,
        max_width: f64,
        max_lines: usize,
    ) -> FittedText {
        let max_size = max_size.max(min_size);
        let wrap = |size: f64| self.wrap_to_width(text, weight, size, max_width);

        let lines = wrap(max_size);
        if lines.len() <= max_lines {
            return FittedText { size: max_size, lines };
        }

        let size = search_size(min_size, max_size, |size| wrap(size).len() <= max_lines);
        FittedText {
            size,
            lines: wrap(size),
        }
    }

    /// Shrink-only single-line fit: the largest size in
    /// `[min_size, max_size]` whose measured width is within `max_width`.
    /// Never wraps; an over-long string stays at `min_size`.
    pub fn fit_single_line(
        &self,
        text: &str,
        weight: Weight,
        max_size: f64,
        min_size: f64,
        max_width: f64,
    ) -> f64 {
        let max_size = max_size.max(min_size);
        if self.measure_width(text, weight, max_size) <= max_width {
            return max_size;
        }
        search_size(min_size, max_size, |size| {
            self.measure_width(text, weight, size) <= max_width
        })
    }
}

/// Binary search for the largest lattice point `min + k * SIZE_STEP` below
/// `max` that satisfies `fits`. Returns `min` when nothing does.
fn search_size(min: f64, max: f64, fits: impl Fn(f64) -> bool) -> f64 {
    let at = |k: usize| min + k as f64 * SIZE_STEP;

    let steps = ((max - min) / SIZE_STEP).floor() as usize;
    // Lattice points strictly below `max`; `max` itself already failed.
    let top = if at(steps) >= max && steps > 0 { steps - 1 } else { steps };

    if !fits(at(0)) {
        return min;
    }
    let (mut lo, mut hi) = (0usize, top + 1);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(at(mid)) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    at(lo)
}

/// Cut `text` to at most `max_chars` characters. No ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitter(fonts: &FontContext) -> TextFitter<'_> {
        TextFitter::new(fonts)
    }

    #[test]
    fn test_measure_width_scales_linearly() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let w10 = f.measure_width("Olive Oil", Weight::Regular, 10.0);
        let w20 = f.measure_width("Olive Oil", Weight::Regular, 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-9);
        assert_eq!(f.measure_width("", Weight::Regular, 10.0), 0.0);
    }

    #[test]
    fn test_bold_measures_wider() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        assert!(
            f.measure_width("Zaytoun", Weight::Bold, 12.0)
                > f.measure_width("Zaytoun", Weight::Regular, 12.0)
        );
    }

    #[test]
    fn test_wrap_lines_within_width() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let text = "Extra virgin olive oil cold pressed from the first harvest of the season";
        for width in [40.0, 80.0, 120.0, 200.0] {
            let lines = f.wrap_to_width(text, Weight::Regular, 10.0, width);
            assert!(!lines.is_empty());
            for line in &lines {
                let w = f.measure_width(line, Weight::Regular, 10.0);
                let single_word = !line.contains(' ');
                assert!(w <= width || single_word, "line '{}' is {}pt wide in {}pt", line, w, width);
            }
            assert_eq!(lines.join(" "), text);
        }
    }

    #[test]
    fn test_wrap_oversized_word_gets_own_line() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let lines = f.wrap_to_width("a Supercalifragilistic b", Weight::Regular, 12.0, 30.0);
        assert_eq!(lines, vec!["a", "Supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_empty_and_whitespace() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        assert!(f.wrap_to_width("", Weight::Regular, 12.0, 100.0).is_empty());
        assert!(f.wrap_to_width("   ", Weight::Regular, 12.0, 100.0).is_empty());
    }

    #[test]
    fn test_wrap_mandatory_break() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let lines = f.wrap_to_width("Buy 1\nGet 1", Weight::Regular, 10.0, 500.0);
        assert_eq!(lines, vec!["Buy 1", "Get 1"]);
    }

    #[test]
    fn test_fit_lines_uses_max_when_it_fits() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let fit = f.fit_lines("Rice", Weight::Regular, 14.0, 7.0, 150.0, 2);
        assert_eq!(fit.size, 14.0);
        assert_eq!(fit.lines, vec!["Rice"]);
    }

    #[test]
    fn test_fit_lines_bounds() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let text = "Basmati rice premium long grain aged two years family pack";
        for width in [20.0, 60.0, 100.0, 150.0, 400.0] {
            for max_lines in 1..4 {
                let fit = f.fit_lines(text, Weight::Regular, 18.0, 6.0, width, max_lines);
                assert!(fit.size >= 6.0 && fit.size <= 18.0);
            }
        }
    }

    #[test]
    fn test_fit_lines_monotonic_in_max_lines() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let text = "Basmati rice premium long grain aged two years family pack";
        for width in [60.0, 100.0, 150.0] {
            let mut previous = f64::INFINITY;
            for max_lines in (1..5).rev() {
                let fit = f.fit_lines(text, Weight::Regular, 18.0, 6.0, width, max_lines);
                assert!(fit.size <= previous);
                previous = fit.size;
            }
        }
    }

    #[test]
    fn test_fit_lines_result_is_the_largest_fitting_lattice_size() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let text = "Chickpeas canned in brine";
        let fit = f.fit_lines(text, Weight::Regular, 20.0, 6.0, 80.0, 2);
        assert!(fit.lines.len() <= 2);
        let next = fit.size + SIZE_STEP;
        if next <= 20.0 {
            assert!(f.wrap_to_width(text, Weight::Regular, next, 80.0).len() > 2);
        }
    }

    #[test]
    fn test_fit_lines_overflow_returns_min() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let fit = f.fit_lines("one two three four five", Weight::Regular, 12.0, 8.0, 10.0, 2);
        assert_eq!(fit.size, 8.0);
        assert_eq!(fit.lines.len(), 5);
    }

    #[test]
    fn test_fit_single_line_shrinks_without_wrapping() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let brand = "The Very Long Brand Name Company";
        let max_width = 150.0 * 0.9;
        assert!(f.measure_width(brand, Weight::Bold, 14.0) > max_width);
        let size = f.fit_single_line(brand, Weight::Bold, 14.0, 5.0, max_width);
        assert!(size < 14.0 && size >= 5.0);
        assert!(f.measure_width(brand, Weight::Bold, size) <= max_width);
        assert!(f.measure_width(brand, Weight::Bold, size + SIZE_STEP) > max_width);
    }

    #[test]
    fn test_fit_single_line_floor_at_min() {
        let fonts = FontContext::standard();
        let f = fitter(&fonts);
        let size = f.fit_single_line("Unreasonably long brand", Weight::Bold, 14.0, 7.0, 20.0);
        assert_eq!(size, 7.0);
    }

    #[test]
    fn test_search_size_lattice() {
        assert_eq!(search_size(7.0, 14.0, |s| s <= 10.1), 10.0);
        assert_eq!(search_size(7.0, 14.0, |_| false), 7.0);
        assert_eq!(search_size(7.0, 7.1, |_| true), 7.0);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Olive Oil Extra Virgin", 9), "Olive Oil");
        assert_eq!(truncate_chars("زيت زيتون", 3), "زيت");
        assert_eq!(truncate_chars("Rice", 28), "Rice");
    }
}
