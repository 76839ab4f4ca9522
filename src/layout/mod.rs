//! # Layout
//!
//! Draw-operation model plus the two layout stages: the page grid
//! (`grid`) assigns every record a card box, and the card composer
//! (`card`) fills that box with text runs, a barcode, and debug overlays.
//!
//! Everything here is a description, not an execution. Coordinates are PDF
//! points with the origin at the page's bottom-left corner and y pointing
//! up; the PDF writer consumes the ops as-is.

pub mod card;
pub mod grid;
pub mod offer;

use crate::barcode::BarcodeSymbol;
use crate::font::Weight;
use crate::image_loader::LoadedImage;

/// A point in page space (or card space, before translation).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse `#rgb` or `#rrggbb`. The leading `#` is optional.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0);
        let (r, g, b) = match hex.len() {
            3 => (
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            ),
            6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
            _ => return None,
        };
        Some(Self { r, g, b })
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// A single-line text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Logical (unshaped) text.
    pub content: String,
    /// Left end of the baseline.
    pub origin: Point,
    pub weight: Weight,
    pub size: f64,
    pub color: Color,
}

/// Several lines, each centred on `origin.x`.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedTextBlock {
    /// The full text before wrapping.
    pub content: String,
    pub lines: Vec<String>,
    /// Centre of the first line's baseline.
    pub origin: Point,
    pub max_width: f64,
    pub weight: Weight,
    pub size: f64,
    /// Baseline-to-baseline distance in points.
    pub line_spacing: f64,
    pub color: Color,
}

impl WrappedTextBlock {
    /// Baseline of the last line.
    pub fn last_baseline(&self) -> f64 {
        let extra = self.lines.len().saturating_sub(1) as f64;
        self.origin.y - extra * self.line_spacing
    }
}

/// A barcode symbol with its bottom-left corner at `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeRun {
    pub code: String,
    pub origin: Point,
    pub symbol: BarcodeSymbol,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    Wrapped(WrappedTextBlock),
    Barcode(BarcodeRun),
    /// Stroked outline of a card box.
    DebugRect {
        origin: Point,
        width: f64,
        height: f64,
    },
}

impl DrawOp {
    /// Move the op by (dx, dy).
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            DrawOp::Text(run) => run.origin = run.origin.offset(dx, dy),
            DrawOp::Wrapped(block) => block.origin = block.origin.offset(dx, dy),
            DrawOp::Barcode(bar) => bar.origin = bar.origin.offset(dx, dy),
            DrawOp::DebugRect { origin, .. } => *origin = origin.offset(dx, dy),
        }
    }

    /// Logical text carried by the op, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text(run) => Some(&run.content),
            DrawOp::Wrapped(block) => Some(&block.content),
            DrawOp::Barcode(_) | DrawOp::DebugRect { .. } => None,
        }
    }
}

/// One output page.
#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    /// Template image drawn beneath everything else (preview only).
    pub background: Option<LoadedImage>,
    pub ops: Vec<DrawOp>,
    /// Number of cards placed on this page.
    pub cards: usize,
}

impl Page {
    pub fn new(index: usize, width: f64, height: f64) -> Self {
        Self {
            index,
            width,
            height,
            background: None,
            ops: Vec::new(),
            cards: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        let c = Color::parse_hex("#d10000").unwrap();
        assert!((c.r - 209.0 / 255.0).abs() < 1e-9);
        assert_eq!(c.g, 0.0);
        assert_eq!(Color::parse_hex("fff"), Some(Color { r: 1.0, g: 1.0, b: 1.0 }));
        assert_eq!(Color::parse_hex("#12"), None);
        assert_eq!(Color::parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_translate_moves_every_op_kind() {
        let mut op = DrawOp::DebugRect {
            origin: Point::new(1.0, 2.0),
            width: 10.0,
            height: 10.0,
        };
        op.translate(5.0, -1.0);
        assert!(matches!(op, DrawOp::DebugRect { origin, .. } if origin == Point::new(6.0, 1.0)));

        let mut op = DrawOp::Text(TextRun {
            content: "Rice".to_string(),
            origin: Point::new(0.0, 0.0),
            weight: Weight::Regular,
            size: 10.0,
            color: Color::BLACK,
        });
        op.translate(100.0, 200.0);
        assert!(matches!(op, DrawOp::Text(ref r) if r.origin == Point::new(100.0, 200.0)));
        assert_eq!(op.text(), Some("Rice"));
    }

    #[test]
    fn test_wrapped_last_baseline() {
        let block = WrappedTextBlock {
            content: "a b".to_string(),
            lines: vec!["a".to_string(), "b".to_string()],
            origin: Point::new(50.0, 100.0),
            max_width: 80.0,
            weight: Weight::Regular,
            size: 10.0,
            line_spacing: 12.0,
            color: Color::BLACK,
        };
        assert_eq!(block.last_baseline(), 88.0);
    }
}
