//! # Shaping
//!
//! Turns a string into a display-ready glyph run: glyph ids in visual
//! (left-to-right) order with their advances.
//!
//! Embedded fonts go through rustybuzz, one BiDi run at a time, so Arabic
//! gets its contextual forms from the font's GSUB tables. The built-in
//! Helvetica pair has no shaping tables; its glyph ids are WinAnsi codes and
//! RTL runs are only reordered, never joined.
//!
//! Shaping is memoized per render pass in a [`ShapeCache`]. Item names and
//! brands repeat across rows, and the fitting search measures the same
//! string at many sizes, so almost every lookup after the first is a hit.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use unicode_bidi::Level;

use super::bidi::{analyze_bidi, is_pure_ltr, visual_order, Direction};
use crate::font::metrics::unicode_to_winansi;
use crate::font::{EmbeddedFont, FontFace, FontSlot, StandardFont};

/// A single positioned glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph id in the face. For standard fonts this is the WinAnsi code.
    pub glyph_id: u16,
    /// Horizontal advance as a fraction of the em.
    pub advance: f64,
    /// First character of the cluster this glyph came from, for ToUnicode.
    pub ch: char,
}

/// Glyphs of one string in visual order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphRun {
    pub glyphs: Vec<ShapedGlyph>,
}

impl GlyphRun {
    /// Total advance at `size` points.
    pub fn width(&self, size: f64) -> f64 {
        self.glyphs.iter().map(|g| g.advance).sum::<f64>() * size
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Shape `text` with `face`.
pub fn shape(text: &str, face: &FontFace) -> GlyphRun {
    match face {
        FontFace::Standard(font) => shape_standard(text, *font),
        FontFace::Embedded(font) => shape_embedded(text, font),
    }
}

fn shape_standard(text: &str, font: StandardFont) -> GlyphRun {
    let chars = visual_chars(text);
    let glyphs = chars
        .into_iter()
        .map(|ch| {
            let code = unicode_to_winansi(ch).unwrap_or(b'?');
            ShapedGlyph {
                glyph_id: code as u16,
                advance: font.code_width(code) as f64 / 1000.0,
                ch,
            }
        })
        .collect();
    GlyphRun { glyphs }
}

/// Characters of `text` in visual order, without any contextual shaping.
fn visual_chars(text: &str) -> Vec<char> {
    if is_pure_ltr(text, Direction::Auto) {
        return text.chars().collect();
    }
    let runs = analyze_bidi(text, Direction::Auto);
    let levels: Vec<Level> = runs.iter().map(|r| r.level).collect();
    let mut out = Vec::with_capacity(text.len());
    for idx in visual_order(&levels) {
        let run = &runs[idx];
        let slice = &text[run.start..run.end];
        if run.is_rtl() {
            out.extend(slice.chars().rev());
        } else {
            out.extend(slice.chars());
        }
    }
    out
}

fn shape_embedded(text: &str, font: &EmbeddedFont) -> GlyphRun {
    let Some(face) = rustybuzz::Face::from_slice(&font.data, 0) else {
        log::warn!("Font '{}' could not be loaded by the shaper", font.name);
        return GlyphRun::default();
    };
    let upem = font.units_per_em.max(1) as f64;

    if is_pure_ltr(text, Direction::Auto) {
        return GlyphRun {
            glyphs: shape_segment(&face, text, false, upem),
        };
    }

    let runs = analyze_bidi(text, Direction::Auto);
    let levels: Vec<Level> = runs.iter().map(|r| r.level).collect();
    let mut glyphs = Vec::new();
    for idx in visual_order(&levels) {
        let run = &runs[idx];
        glyphs.extend(shape_segment(
            &face,
            &text[run.start..run.end],
            run.is_rtl(),
            upem,
        ));
    }
    GlyphRun { glyphs }
}

/// Shape one directional run. RTL output from the shaper is already in
/// visual order.
fn shape_segment(
    face: &rustybuzz::Face<'_>,
    text: &str,
    is_rtl: bool,
    upem: f64,
) -> Vec<ShapedGlyph> {
    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.guess_segment_properties();
    buffer.set_direction(if is_rtl {
        rustybuzz::Direction::RightToLeft
    } else {
        rustybuzz::Direction::LeftToRight
    });

    let output = rustybuzz::shape(face, &[], buffer);
    output
        .glyph_infos()
        .iter()
        .zip(output.glyph_positions())
        .map(|(info, pos)| ShapedGlyph {
            glyph_id: info.glyph_id as u16,
            advance: pos.x_advance as f64 / upem,
            ch: text
                .get(info.cluster as usize..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or('\u{FFFD}'),
        })
        .collect()
}

/// Per-pass shaping memo keyed by face slot and exact string.
#[derive(Debug, Default)]
pub struct ShapeCache {
    runs: RefCell<HashMap<(FontSlot, String), Rc<GlyphRun>>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached run or shape and store it.
    pub fn get_or_shape(&self, text: &str, slot: FontSlot, face: &FontFace) -> Rc<GlyphRun> {
        let key = (slot, text.to_string());
        if let Some(run) = self.runs.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return Rc::clone(run);
        }
        self.misses.set(self.misses.get() + 1);
        let run = Rc::new(shape(text, face));
        self.runs.borrow_mut().insert(key, Rc::clone(&run));
        run
    }

    /// (hits, misses) since the pass started.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.get(), self.misses.get())
    }

    pub fn len(&self) -> usize {
        self.runs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helvetica() -> FontFace {
        FontFace::Standard(StandardFont::Helvetica)
    }

    #[test]
    fn test_standard_width_matches_afm() {
        let run = shape("Hi", &helvetica());
        // H = 722, i = 222
        assert!((run.width(10.0) - 9.44).abs() < 1e-9);
    }

    #[test]
    fn test_standard_unmapped_becomes_question_mark() {
        let run = shape("a\u{4E00}", &helvetica());
        assert_eq!(run.glyphs[1].glyph_id, b'?' as u16);
        assert_eq!(run.glyphs[1].ch, '\u{4E00}');
    }

    #[test]
    fn test_standard_rtl_is_reordered() {
        let run = shape("\u{0627}\u{0628}", &helvetica());
        let chars: Vec<char> = run.glyphs.iter().map(|g| g.ch).collect();
        assert_eq!(chars, vec!['\u{0628}', '\u{0627}']);
    }

    #[test]
    fn test_empty_text_shapes_to_empty_run() {
        assert!(shape("", &helvetica()).is_empty());
    }

    #[test]
    fn test_cache_hits_on_repeat() {
        let cache = ShapeCache::new();
        let face = helvetica();
        let a = cache.get_or_shape("Rice", FontSlot::Regular, &face);
        let b = cache.get_or_shape("Rice", FontSlot::Regular, &face);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_cache_separates_slots() {
        let cache = ShapeCache::new();
        let regular = helvetica();
        let bold = FontFace::Standard(StandardFont::HelveticaBold);
        let a = cache.get_or_shape("Rice", FontSlot::Regular, &regular);
        let b = cache.get_or_shape("Rice", FontSlot::Bold, &bold);
        assert!(b.width(10.0) > a.width(10.0));
        assert_eq!(cache.len(), 2);
    }
}
