//! # Font Management
//!
//! Every render pass draws with one family in up to two weights. The
//! family is either a TrueType/OpenType asset supplied at render time
//! (required for Arabic glyph coverage) or the built-in Helvetica pair,
//! which needs no embedding but only covers WinAnsi.
//!
//! A missing or unreadable font asset is a degraded path, not a failure:
//! the context falls back to Helvetica and logs a warning. Callers that
//! cannot accept the degradation use `FontContext::load_required`.

pub mod metrics;

use std::path::Path;

pub use metrics::StandardFont;

use crate::config::LayoutConfig;
use crate::error::LabelError;

/// Requested visual weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

/// Which of the two faces a run is drawn with. Also the PDF resource index
/// (`/F0`, `/F1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontSlot {
    Regular = 0,
    Bold = 1,
}

/// A TrueType/OpenType font that is embedded into the PDF.
#[derive(Debug, Clone)]
pub struct EmbeddedFont {
    /// PostScript-safe name used for /BaseFont.
    pub name: String,
    pub data: Vec<u8>,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub cap_height: i16,
    /// Global bounding box (x_min, y_min, x_max, y_max) in font units.
    pub bbox: (i16, i16, i16, i16),
}

impl EmbeddedFont {
    /// Parse font data, keeping the metrics the PDF writer needs.
    pub fn from_bytes(data: Vec<u8>, fallback_name: &str) -> Result<Self, LabelError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| LabelError::Font(format!("Failed to parse font '{}': {}", fallback_name, e)))?;

        let name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| fallback_name.to_string());
        let bbox = face.global_bounding_box();
        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascender);

        Ok(Self {
            name: sanitize_font_name(&name),
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox: (bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max),
            data,
        })
    }

    /// Advance of a glyph in 1/1000 em, for the PDF /W array.
    pub fn glyph_width_1000(&self, glyph_id: u16) -> f64 {
        ttf_parser::Face::parse(&self.data, 0)
            .ok()
            .and_then(|face| face.glyph_hor_advance(ttf_parser::GlyphId(glyph_id)))
            .map(|adv| adv as f64 * 1000.0 / self.units_per_em as f64)
            .unwrap_or(0.0)
    }
}

/// One drawable face.
#[derive(Debug, Clone)]
pub enum FontFace {
    Standard(StandardFont),
    Embedded(EmbeddedFont),
}

impl FontFace {
    pub fn is_embedded(&self) -> bool {
        matches!(self, FontFace::Embedded(_))
    }
}

/// A face resolved for a requested weight.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedFace<'a> {
    pub face: &'a FontFace,
    pub slot: FontSlot,
    /// True when bold was requested but only the regular face exists;
    /// the run is then drawn with fill+stroke.
    pub synthetic_bold: bool,
}

/// The font family for one render pass.
#[derive(Debug, Clone)]
pub struct FontContext {
    regular: FontFace,
    bold: Option<FontFace>,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::standard()
    }
}

impl FontContext {
    /// The built-in Helvetica pair. Arabic text will not render correctly.
    pub fn standard() -> Self {
        Self {
            regular: FontFace::Standard(StandardFont::Helvetica),
            bold: Some(FontFace::Standard(StandardFont::HelveticaBold)),
        }
    }

    /// Build from raw font bytes. The bold face is optional; without it,
    /// bold runs are rendered synthetically.
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self, LabelError> {
        let regular = EmbeddedFont::from_bytes(regular, "LabelFont")?;
        let bold = match bold {
            Some(data) => Some(FontFace::Embedded(EmbeddedFont::from_bytes(
                data,
                "LabelFont-Bold",
            )?)),
            None => None,
        };
        Ok(Self {
            regular: FontFace::Embedded(regular),
            bold,
        })
    }

    /// Load font assets from disk, degrading instead of failing.
    ///
    /// A missing regular face falls back to the built-in Helvetica pair.
    /// A missing bold face (with a good regular face) means synthetic bold.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Self {
        let Some(regular_path) = regular else {
            log::warn!("No font asset configured; using built-in Helvetica (Arabic will not render correctly)");
            return Self::standard();
        };

        let regular = match read_font(regular_path) {
            Ok(font) => font,
            Err(e) => {
                log::warn!("{}; using built-in Helvetica (Arabic will not render correctly)", e);
                return Self::standard();
            }
        };

        let bold = bold.and_then(|path| match read_font(path) {
            Ok(font) => Some(FontFace::Embedded(font)),
            Err(e) => {
                log::warn!("{}; bold text will use synthetic bold", e);
                None
            }
        });

        Self {
            regular: FontFace::Embedded(regular),
            bold,
        }
    }

    /// Load font assets from disk; any failure is fatal.
    pub fn load_required(regular: &Path, bold: Option<&Path>) -> Result<Self, LabelError> {
        let regular = read_font(regular)?;
        let bold = match bold {
            Some(path) => Some(FontFace::Embedded(read_font(path)?)),
            None => None,
        };
        Ok(Self {
            regular: FontFace::Embedded(regular),
            bold,
        })
    }

    /// Load font assets the way `config` asks: any failure is fatal when
    /// `require_font` is set, degraded otherwise.
    pub fn load_configured(
        config: &LayoutConfig,
        regular: Option<&Path>,
        bold: Option<&Path>,
    ) -> Result<Self, LabelError> {
        if !config.flag("require_font")? {
            return Ok(Self::load(regular, bold));
        }
        match regular {
            Some(path) => Self::load_required(path, bold),
            None => Err(LabelError::Font(
                "require_font is set but no font file was given".to_string(),
            )),
        }
    }

    /// True when text is drawn with the built-in fallback instead of an
    /// embedded asset.
    pub fn is_fallback(&self) -> bool {
        !self.regular.is_embedded()
    }

    /// Drop the bold face, so bold runs are drawn synthetically.
    pub fn without_bold(self) -> Self {
        Self { bold: None, ..self }
    }

    pub fn has_bold_face(&self) -> bool {
        self.bold.is_some()
    }

    /// Pick the face for a weight.
    pub fn resolve(&self, weight: Weight) -> ResolvedFace<'_> {
        match (weight, &self.bold) {
            (Weight::Bold, Some(bold)) => ResolvedFace {
                face: bold,
                slot: FontSlot::Bold,
                synthetic_bold: false,
            },
            (Weight::Bold, None) => ResolvedFace {
                face: &self.regular,
                slot: FontSlot::Regular,
                synthetic_bold: true,
            },
            (Weight::Regular, _) => ResolvedFace {
                face: &self.regular,
                slot: FontSlot::Regular,
                synthetic_bold: false,
            },
        }
    }

    /// The face behind a slot.
    pub fn face(&self, slot: FontSlot) -> &FontFace {
        match slot {
            FontSlot::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontSlot::Regular => &self.regular,
        }
    }
}

fn read_font(path: &Path) -> Result<EmbeddedFont, LabelError> {
    let data = std::fs::read(path).map_err(|e| {
        LabelError::Font(format!("Failed to read font file '{}': {}", path.display(), e))
    })?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("LabelFont");
    EmbeddedFont::from_bytes(data, stem)
}

/// Sanitize a font name for use as a PDF name object.
pub(crate) fn sanitize_font_name(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        "LabelFont".to_string()
    } else {
        name
    }
}
