//! # BiDi Text Support
//!
//! Implements the parts of UAX#9 (Unicode Bidirectional Algorithm) that a
//! single-line label needs. Uses `unicode-bidi` for level resolution.
//!
//! The pipeline:
//! 1. Resolve embedding levels, split into directional runs
//! 2. Each run is shaped independently with its own direction
//! 3. Runs are put into visual order (rule L2)

use unicode_bidi::{BidiInfo, Level};

/// Paragraph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Ltr,
    Rtl,
    /// Detect from the first strong character.
    #[default]
    Auto,
}

/// A contiguous run of text with a single BiDi level.
#[derive(Debug, Clone)]
pub struct BidiRun {
    /// Start byte offset in the original text.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// BiDi embedding level (even = LTR, odd = RTL).
    pub level: Level,
}

impl BidiRun {
    pub fn is_rtl(&self) -> bool {
        self.level.is_rtl()
    }
}

/// Split text into runs of equal embedding level, in logical order.
///
/// Only the first paragraph is considered; label fields never contain
/// paragraph separators that matter.
pub fn analyze_bidi(text: &str, direction: Direction) -> Vec<BidiRun> {
    if text.is_empty() {
        return vec![];
    }

    let para_level = match direction {
        Direction::Ltr => Some(Level::ltr()),
        Direction::Rtl => Some(Level::rtl()),
        Direction::Auto => None,
    };

    let bidi_info = BidiInfo::new(text, para_level);
    let Some(paragraph) = bidi_info.paragraphs.first() else {
        return vec![];
    };
    let levels = &bidi_info.levels;

    let mut runs: Vec<BidiRun> = Vec::new();
    for (byte_idx, ch) in text[paragraph.range.clone()].char_indices() {
        let byte_idx = byte_idx + paragraph.range.start;
        let level = levels[byte_idx];
        let end = byte_idx + ch.len_utf8();
        match runs.last_mut() {
            Some(run) if run.level == level => run.end = end,
            _ => runs.push(BidiRun {
                start: byte_idx,
                end,
                level,
            }),
        }
    }
    runs
}

/// Check if text is purely LTR (no RTL characters at all).
/// This is the fast path that skips BiDi processing for Latin fields.
pub fn is_pure_ltr(text: &str, direction: Direction) -> bool {
    if matches!(direction, Direction::Rtl) {
        return false;
    }
    !text.chars().any(is_rtl_char)
}

/// Check if a character belongs to a right-to-left block.
fn is_rtl_char(ch: char) -> bool {
    matches!(ch,
        '\u{0590}'..='\u{05FF}' |  // Hebrew
        '\u{0600}'..='\u{06FF}' |  // Arabic
        '\u{0700}'..='\u{074F}' |  // Syriac
        '\u{0750}'..='\u{077F}' |  // Arabic Supplement
        '\u{08A0}'..='\u{08FF}' |  // Arabic Extended-A
        '\u{FB1D}'..='\u{FB4F}' |  // Hebrew Presentation Forms
        '\u{FB50}'..='\u{FDFF}' |  // Arabic Presentation Forms-A
        '\u{FE70}'..='\u{FEFF}' |  // Arabic Presentation Forms-B
        '\u{200F}' | '\u{202B}' | '\u{202E}' | '\u{2067}'
    )
}

/// Visual order of items with the given levels (rule L2).
///
/// Returns indices into `levels` in left-to-right display order: from the
/// highest level down to the lowest odd level, every maximal sequence at
/// that level or above is reversed.
pub fn visual_order(levels: &[Level]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    if levels.is_empty() {
        return order;
    }

    let min_level = levels.iter().copied().min().unwrap_or(Level::ltr());
    let max_level = levels.iter().copied().max().unwrap_or(Level::ltr());
    if !max_level.is_rtl() {
        return order;
    }

    let lowest_odd = if min_level.is_rtl() {
        min_level.number()
    } else {
        min_level.number() + 1
    };

    let mut current = max_level.number();
    while current >= lowest_odd {
        let mut i = 0;
        while i < order.len() {
            if levels[order[i]].number() >= current {
                let start = i;
                while i < order.len() && levels[order[i]].number() >= current {
                    i += 1;
                }
                order[start..i].reverse();
            } else {
                i += 1;
            }
        }
        if current == 0 {
            break;
        }
        current -= 1;
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_ltr() {
        assert!(is_pure_ltr("Olive Oil 1L", Direction::Ltr));
        assert!(is_pure_ltr("Olive Oil 1L", Direction::Auto));
        assert!(!is_pure_ltr("Olive Oil 1L", Direction::Rtl));
    }

    #[test]
    fn test_rtl_detection() {
        assert!(!is_pure_ltr("زيت زيتون", Direction::Auto));
        assert!(!is_pure_ltr("שלום", Direction::Ltr));
    }

    #[test]
    fn test_analyze_bidi_pure_ltr() {
        let runs = analyze_bidi("Hello World", Direction::Ltr);
        assert_eq!(runs.len(), 1);
        assert!(!runs[0].is_rtl());
        assert_eq!(runs[0].start, 0);
        assert_eq!(runs[0].end, 11);
    }

    #[test]
    fn test_analyze_bidi_pure_rtl() {
        let runs = analyze_bidi("مرحبا", Direction::Auto);
        assert_eq!(runs.len(), 1);
        assert!(runs[0].is_rtl());
        assert_eq!(runs[0].end, "مرحبا".len());
    }

    #[test]
    fn test_analyze_bidi_mixed_offer() {
        // Arabic paragraph with an embedded number: the digits sit at a
        // higher (even) level inside the RTL paragraph.
        let text = "خصم 25%";
        let runs = analyze_bidi(text, Direction::Auto);
        assert!(runs.len() >= 2, "Expected at least 2 runs, got {}", runs.len());
        assert!(runs[0].is_rtl());
        assert!(runs.iter().any(|r| !r.is_rtl()));
        assert_eq!(runs.last().map(|r| r.end), Some(text.len()));
    }

    #[test]
    fn test_analyze_bidi_empty() {
        assert!(analyze_bidi("", Direction::Auto).is_empty());
    }

    #[test]
    fn test_visual_order_ltr_untouched() {
        let levels = vec![Level::ltr(); 3];
        assert_eq!(visual_order(&levels), vec![0, 1, 2]);
    }

    #[test]
    fn test_visual_order_rtl_reversed() {
        let levels = vec![Level::rtl(); 4];
        assert_eq!(visual_order(&levels), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_visual_order_embedded_ltr_keeps_inner_order() {
        // R R L L inside an RTL paragraph: levels 1 1 2 2
        let l2 = Level::new(2).unwrap();
        let levels = vec![Level::rtl(), Level::rtl(), l2, l2];
        assert_eq!(visual_order(&levels), vec![2, 3, 1, 0]);
    }
}
