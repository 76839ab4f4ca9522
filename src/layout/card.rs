//! # Card Composer
//!
//! Turns one record into the draw ops for one card, in card-local space
//! (origin at the box's bottom-left corner). The assembler translates the
//! ops onto the page afterwards.
//!
//! Elements, top to bottom: optional header, brand, English name, Arabic
//! name, offer (plus a secondary Arabic line for numeric offers), and the
//! barcode with its code underneath. The barcode is anchored to the box
//! bottom; everything else follows the configured flow:
//!
//! - **zero-line**: each baseline is `zero + offset`, where the zero-line
//!   sits at `zero_line_ratio` of the box height. Empty fields still hold
//!   their position, so the other elements never move.
//! - **chained**: each baseline is the previous element's last baseline
//!   minus a gap, starting `flow_top` below the box top. An empty field is
//!   still emitted, but the cursor does not advance past it.
//!
//! Wrapped names and offers grow downward from their baseline. Only the
//! chained flow makes room for the extra lines; under the zero-line flow
//! the next element keeps its fixed slot, so `wrap` belongs with `chained`.

use crate::config::LayoutConfig;
use crate::error::LabelError;
use crate::font::Weight;
use crate::layout::offer::{apply_template, normalize_offer, Offer};
use crate::layout::{BarcodeRun, Color, DrawOp, Point, TextRun, WrappedTextBlock};
use crate::model::LabelRecord;
use crate::render::RenderPass;
use crate::text::truncate_chars;

/// Vertical positions for one flow element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSlots {
    pub brand: f64,
    pub name: f64,
    pub arabic: f64,
    pub offer: f64,
    pub offer_secondary: f64,
}

impl FlowSlots {
    /// Values in flow order, with element names.
    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("brand", self.brand),
            ("name", self.name),
            ("arabic name", self.arabic),
            ("offer", self.offer),
            ("secondary offer", self.offer_secondary),
        ]
    }
}

/// How element baselines are derived.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Offsets from a shared zero-line.
    ZeroLine { ratio: f64, offsets: FlowSlots },
    /// Gaps from the previous element, starting `top` below the box top.
    Chained { top: f64, gaps: FlowSlots },
}

/// How a name field deals with a box that is too narrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFit {
    /// Cut to a character count, fixed size.
    Truncate(usize),
    /// Single line, shrink towards the minimum size.
    Shrink,
    /// Wrap, shrinking until the line limit is met.
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferStyle {
    Single,
    Wrapped { max_lines: usize },
}

/// A static line at the top of every card.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub text: String,
    pub size: f64,
    /// Baseline distance below the box top.
    pub offset: f64,
}

/// Resolved card settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSpec {
    pub flow: Flow,
    pub header: Option<Header>,
    pub width_margin: f64,
    pub line_height: f64,
    pub brand_max_size: f64,
    pub brand_min_size: f64,
    pub name_fit: NameFit,
    pub name_size: f64,
    pub name_min_size: f64,
    pub name_max_lines: usize,
    pub arabic_size: f64,
    pub arabic_min_size: f64,
    pub offer_style: OfferStyle,
    pub offer_size: f64,
    pub offer_min_size: f64,
    pub offer_secondary_size: f64,
    pub offer_color: Color,
    pub normalize_offer: bool,
    pub offer_template: String,
    pub offer_secondary_template: String,
    pub bold_stroke: f64,
    pub barcode_bottom: f64,
    pub module_width: f64,
    pub barcode_height: f64,
    pub code_size: f64,
    pub code_gap: f64,
}

impl CardSpec {
    pub fn from_config(config: &LayoutConfig) -> Result<Self, LabelError> {
        let flow = match config.keyword("flow", &["zero_line", "chained"])? {
            "chained" => Flow::Chained {
                top: config.length("flow_top")?,
                gaps: slots(config, "gap")?,
            },
            _ => Flow::ZeroLine {
                ratio: config.number("zero_line_ratio")?,
                offsets: slots(config, "offset")?,
            },
        };

        let header = match config.optional_text("header_text")? {
            Some(text) if !text.trim().is_empty() => Some(Header {
                text: text.to_string(),
                size: config.positive("header_size")?,
                offset: config.length("header_offset")?,
            }),
            _ => None,
        };

        let name_fit = match config.keyword("name_fit", &["truncate", "shrink", "wrap"])? {
            "shrink" => NameFit::Shrink,
            "wrap" => NameFit::Wrap,
            _ => NameFit::Truncate(config.count("truncate_chars")?),
        };

        let offer_style = match config.keyword("offer_style", &["single", "wrapped"])? {
            "wrapped" => OfferStyle::Wrapped {
                max_lines: config.count("offer_max_lines")?,
            },
            _ => OfferStyle::Single,
        };

        let color_text = config.text("offer_color")?;
        let offer_color = Color::parse_hex(color_text).ok_or_else(|| {
            LabelError::invalid("offer_color", format!("'{}' is not a #rrggbb color", color_text))
        })?;

        let width_margin = config.positive("width_margin")?;
        if width_margin > 1.0 {
            return Err(LabelError::invalid(
                "width_margin",
                format!("must be at most 1, got {}", width_margin),
            ));
        }

        Ok(Self {
            flow,
            header,
            width_margin,
            line_height: config.positive("line_height")?,
            brand_max_size: config.positive("brand_max_size")?,
            brand_min_size: config.positive("brand_min_size")?,
            name_fit,
            name_size: config.positive("name_size")?,
            name_min_size: config.positive("name_min_size")?,
            name_max_lines: config.count("name_max_lines")?,
            arabic_size: config.positive("arabic_size")?,
            arabic_min_size: config.positive("arabic_min_size")?,
            offer_style,
            offer_size: config.positive("offer_size")?,
            offer_min_size: config.positive("offer_min_size")?,
            offer_secondary_size: config.positive("offer_secondary_size")?,
            offer_color,
            normalize_offer: config.flag("normalize_offer")?,
            offer_template: config.text("offer_template")?.to_string(),
            offer_secondary_template: config.text("offer_secondary_template")?.to_string(),
            bold_stroke: config.number("bold_stroke")?,
            barcode_bottom: config.length("barcode_bottom")?,
            module_width: config.positive("barcode_module_width")?,
            barcode_height: config.positive("barcode_height")?,
            code_size: config.positive("code_size")?,
            code_gap: config.length("code_gap")?,
        })
    }

    /// Lowest and highest card-local y each element can take in a box of
    /// `height`: text baselines, and the barcode's bottom and top.
    ///
    /// In chained flow an empty element skips its gap, so every subset of
    /// the earlier gaps is possible; the range covers all of them.
    pub fn vertical_extents(&self, height: f64) -> Vec<(&'static str, f64, f64)> {
        let mut extents = Vec::new();
        if let Some(header) = &self.header {
            let y = height - header.offset;
            extents.push(("header", y, y));
        }

        match &self.flow {
            Flow::ZeroLine { ratio, offsets } => {
                for (element, offset) in offsets.named() {
                    let y = height * ratio + offset;
                    extents.push((element, y, y));
                }
            }
            Flow::Chained { top, gaps } => {
                let start = height - top;
                let (mut most_down, mut most_up) = (0.0_f64, 0.0_f64);
                for (element, gap) in gaps.named() {
                    extents.push((element, start - most_down - gap, start - most_up - gap));
                    most_down += gap.max(0.0);
                    most_up += gap.min(0.0);
                }
            }
        }

        extents.push(("barcode", self.barcode_bottom, self.barcode_bottom + self.barcode_height));
        let code = self.barcode_bottom - self.code_gap;
        extents.push(("item code", code.min(self.barcode_bottom), code.max(self.barcode_bottom)));
        extents
    }

    /// Every element must stay within a card of `height`.
    pub fn validate(&self, height: f64) -> Result<(), LabelError> {
        const EPSILON: f64 = 1e-6;
        for (element, low, high) in self.vertical_extents(height) {
            let y = if low < -EPSILON {
                low
            } else if high > height + EPSILON {
                high
            } else {
                continue;
            };
            return Err(LabelError::ElementOutOfBounds {
                element: element.to_string(),
                y,
                card_height: height,
            });
        }
        Ok(())
    }
}

fn slots(config: &LayoutConfig, kind: &str) -> Result<FlowSlots, LabelError> {
    let get = |element: &str| config.length(&format!("{}_{}", element, kind));
    Ok(FlowSlots {
        brand: get("brand")?,
        name: get("name")?,
        arabic: get("arabic")?,
        offer: get("offer")?,
        offer_secondary: get("offer_secondary")?,
    })
}

/// Tracks where the next flow element goes.
enum Cursor {
    Zero { zero: f64, offsets: FlowSlots },
    Chained { y: f64, gaps: FlowSlots },
}

impl Cursor {
    fn baseline(&self, pick: fn(&FlowSlots) -> f64) -> f64 {
        match self {
            Cursor::Zero { zero, offsets } => zero + pick(offsets),
            Cursor::Chained { y, gaps } => y - pick(gaps),
        }
    }

    /// Record that an element ended at `last_baseline`. Empty elements do
    /// not move a chained cursor.
    fn advance(&mut self, last_baseline: f64, empty: bool) {
        if let Cursor::Chained { y, .. } = self {
            if !empty {
                *y = last_baseline;
            }
        }
    }
}

/// Lays out cards against one render pass.
pub struct CardComposer<'p, 'a> {
    spec: &'p CardSpec,
    pass: &'p RenderPass<'a>,
}

impl<'p, 'a> CardComposer<'p, 'a> {
    pub fn new(spec: &'p CardSpec, pass: &'p RenderPass<'a>) -> Self {
        Self { spec, pass }
    }

    /// Draw ops for `record` in a `width` x `height` box, card-local.
    pub fn compose(&self, record: &LabelRecord, width: f64, height: f64, debug: bool) -> Vec<DrawOp> {
        let spec = self.spec;
        let mut ops = Vec::new();
        let center = width / 2.0;
        let max_width = width * spec.width_margin;

        if debug {
            ops.push(DrawOp::DebugRect {
                origin: Point::new(0.0, 0.0),
                width,
                height,
            });
        }

        if let Some(header) = &spec.header {
            let baseline = height - header.offset;
            ops.push(self.centered(&header.text, Weight::Regular, header.size, Color::BLACK, center, baseline));
        }

        let mut cursor = match &spec.flow {
            Flow::ZeroLine { ratio, offsets } => Cursor::Zero {
                zero: height * ratio,
                offsets: *offsets,
            },
            Flow::Chained { top, gaps } => Cursor::Chained {
                y: height - top,
                gaps: *gaps,
            },
        };

        // Brand: bold, one line, shrink only
        let brand = record.brand.trim();
        let baseline = cursor.baseline(|s| s.brand);
        let size = self.pass.text.fit_single_line(
            brand,
            Weight::Bold,
            spec.brand_max_size,
            spec.brand_min_size,
            max_width,
        );
        ops.push(self.centered(brand, Weight::Bold, size, Color::BLACK, center, baseline));
        cursor.advance(baseline, brand.is_empty());

        // Names
        let english = record.english_name.trim();
        let baseline = cursor.baseline(|s| s.name);
        let (op, last) = self.name(english, spec.name_size, spec.name_min_size, center, baseline, max_width);
        ops.push(op);
        cursor.advance(last, english.is_empty());

        let arabic = record.arabic_name.trim();
        let baseline = cursor.baseline(|s| s.arabic);
        let (op, last) = self.name(arabic, spec.arabic_size, spec.arabic_min_size, center, baseline, max_width);
        ops.push(op);
        cursor.advance(last, arabic.is_empty());

        // Offer
        let offer = if spec.normalize_offer {
            normalize_offer(&record.offer)
        } else {
            Offer::Literal(record.offer.clone())
        };
        let primary = match &offer {
            Offer::Numeric(value) => apply_template(&spec.offer_template, value),
            Offer::Literal(text) => text.trim().to_string(),
        };
        let baseline = cursor.baseline(|s| s.offer);
        let (op, last) = self.offer(&primary, center, baseline, max_width);
        ops.push(op);
        cursor.advance(last, primary.is_empty());

        if let Offer::Numeric(value) = &offer {
            let secondary = apply_template(&spec.offer_secondary_template, value);
            let baseline = cursor.baseline(|s| s.offer_secondary);
            let size = self.pass.text.fit_single_line(
                &secondary,
                Weight::Bold,
                spec.offer_secondary_size,
                spec.offer_min_size.min(spec.offer_secondary_size),
                max_width,
            );
            ops.push(self.centered(&secondary, Weight::Bold, size, spec.offer_color, center, baseline));
        }

        self.barcode(record.clean_code(), center, max_width, &mut ops);
        ops
    }

    /// A single run centred on `center`.
    fn centered(&self, text: &str, weight: Weight, size: f64, color: Color, center: f64, baseline: f64) -> DrawOp {
        let width = self.pass.text.measure_width(text, weight, size);
        DrawOp::Text(TextRun {
            content: text.to_string(),
            origin: Point::new(center - width / 2.0, baseline),
            weight,
            size,
            color,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn wrapped(&self, text: &str, lines: Vec<String>, weight: Weight, size: f64, color: Color, center: f64, baseline: f64, max_width: f64) -> (DrawOp, f64) {
        let block = WrappedTextBlock {
            content: text.to_string(),
            lines,
            origin: Point::new(center, baseline),
            max_width,
            weight,
            size,
            line_spacing: size * self.spec.line_height,
            color,
        };
        let last = block.last_baseline();
        (DrawOp::Wrapped(block), last)
    }

    #[allow(clippy::too_many_arguments)]
    fn name(&self, text: &str, size: f64, min_size: f64, center: f64, baseline: f64, max_width: f64) -> (DrawOp, f64) {
        let text_fit = &self.pass.text;
        match self.spec.name_fit {
            NameFit::Truncate(max_chars) => {
                let cut = truncate_chars(text, max_chars);
                (self.centered(&cut, Weight::Regular, size, Color::BLACK, center, baseline), baseline)
            }
            NameFit::Shrink => {
                let fitted = text_fit.fit_single_line(text, Weight::Regular, size, min_size, max_width);
                (self.centered(text, Weight::Regular, fitted, Color::BLACK, center, baseline), baseline)
            }
            NameFit::Wrap => {
                let fit = text_fit.fit_lines(text, Weight::Regular, size, min_size, max_width, self.spec.name_max_lines);
                self.wrapped(text, fit.lines, Weight::Regular, fit.size, Color::BLACK, center, baseline, max_width)
            }
        }
    }

    fn offer(&self, text: &str, center: f64, baseline: f64, max_width: f64) -> (DrawOp, f64) {
        let spec = self.spec;
        let text_fit = &self.pass.text;
        match spec.offer_style {
            OfferStyle::Single => {
                let size = text_fit.fit_single_line(text, Weight::Bold, spec.offer_size, spec.offer_min_size, max_width);
                (self.centered(text, Weight::Bold, size, spec.offer_color, center, baseline), baseline)
            }
            OfferStyle::Wrapped { max_lines } => {
                let fit = text_fit.fit_lines(text, Weight::Bold, spec.offer_size, spec.offer_min_size, max_width, max_lines);
                self.wrapped(text, fit.lines, Weight::Bold, fit.size, spec.offer_color, center, baseline, max_width)
            }
        }
    }

    /// Symbol centred above `barcode_bottom` with the code under it. A code
    /// that cannot be encoded is drawn as plain text where the symbol
    /// would have been. A symbol wider than `max_width` gets narrower
    /// modules.
    fn barcode(&self, code: &str, center: f64, max_width: f64, ops: &mut Vec<DrawOp>) {
        if code.is_empty() {
            return;
        }
        let spec = self.spec;
        match self.pass.barcodes.symbol(code, spec.module_width, spec.barcode_height) {
            Ok(mut symbol) => {
                if symbol.width() > max_width && !symbol.modules.is_empty() {
                    let narrowed = max_width / symbol.modules.len() as f64;
                    log::debug!(
                        "Barcode '{}' is {:.1}pt wide, narrowing modules from {} to {:.3}",
                        code,
                        symbol.width(),
                        symbol.module_width,
                        narrowed
                    );
                    symbol.module_width = narrowed;
                }
                let origin = Point::new(center - symbol.width() / 2.0, spec.barcode_bottom);
                ops.push(DrawOp::Barcode(BarcodeRun {
                    code: code.to_string(),
                    origin,
                    symbol,
                }));
                let baseline = spec.barcode_bottom - spec.code_gap;
                ops.push(self.centered(code, Weight::Regular, spec.code_size, Color::BLACK, center, baseline));
            }
            Err(_) => {
                ops.push(self.centered(code, Weight::Regular, spec.code_size, Color::BLACK, center, spec.barcode_bottom));
            }
        }
    }
}
