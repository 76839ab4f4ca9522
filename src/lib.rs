//! # labelsheet
//!
//! Renders product offer records onto sheets of pre-printed label stock.
//!
//! Each record becomes one card in a fixed grid (3 x 2 on A4 by default):
//! brand, English and Arabic names, the offer in a highlight color, and a
//! Code 128 barcode of the item code. Text is shrunk, wrapped, or truncated
//! to fit its card; Arabic is shaped and reordered when an embedded font is
//! available. Every position is driven by a flat calibration mapping, so a
//! sheet can be nudged into registration with the paper in the printer.
//!
//! ## Architecture
//!
//! ```text
//! records + LayoutConfig
//!       ↓
//!   [config]   : resolve and validate every option up front
//!       ↓
//!   [layout]   : grid places cards, composer emits draw ops per card
//!       ↓            (text fitting, shaping, barcodes via a RenderPass)
//!   [pdf]      : serialize pages to PDF bytes
//! ```

pub mod barcode;
pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod render;
pub mod text;
pub mod units;

use std::time::Instant;

pub use config::{LabelLayout, LayoutConfig};
pub use error::LabelError;
pub use font::FontContext;
pub use image_loader::LoadedImage;
pub use model::LabelRecord;
pub use render::{layout_pages, RenderMode, RenderPass};

use pdf::PdfWriter;

/// Render every record to a PDF.
///
/// Configuration problems (a missing option, an impossible grid, a card box
/// off the page, a required font that fell back) fail before any page is
/// laid out. Anything that goes wrong inside a single card is recovered
/// and logged.
pub fn render(
    records: &[LabelRecord],
    config: &LayoutConfig,
    fonts: &FontContext,
) -> Result<Vec<u8>, LabelError> {
    render_with_mode(records, config, fonts, RenderMode::Full)
}

/// Render the first page only, optionally over a template image.
pub fn render_preview(
    records: &[LabelRecord],
    config: &LayoutConfig,
    fonts: &FontContext,
    background: Option<&LoadedImage>,
) -> Result<Vec<u8>, LabelError> {
    render_with_mode(records, config, fonts, RenderMode::Preview { background })
}

/// Render from JSON: an array of records and a flat object of option
/// overrides, merged onto [`LayoutConfig::preset`]. Uses the built-in
/// fonts.
pub fn render_json(records_json: &str, config_json: &str) -> Result<Vec<u8>, LabelError> {
    let records = model::records_from_json(records_json)?;
    let mut config = LayoutConfig::preset();
    config.merge(&LayoutConfig::from_json(config_json)?);
    render(&records, &config, &FontContext::standard())
}

fn render_with_mode(
    records: &[LabelRecord],
    config: &LayoutConfig,
    fonts: &FontContext,
    mode: RenderMode<'_>,
) -> Result<Vec<u8>, LabelError> {
    let t0 = Instant::now();

    let layout = LabelLayout::resolve(config)?;
    if layout.require_font && fonts.is_fallback() {
        return Err(LabelError::Font(
            "an embedded font is required but only the built-in fallback is loaded".to_string(),
        ));
    }

    let pass = RenderPass::new(fonts);
    let pages = layout_pages(records, &layout, &pass, mode);
    let t_layout = t0.elapsed();

    let bytes = PdfWriter::new(layout.card.bold_stroke).write(&pages, &pass);
    let t_total = t0.elapsed();

    let (hits, misses) = pass.text.cache().stats();
    log::debug!(
        "Shape cache: {} hits, {} misses; barcode cache: {} codes",
        hits,
        misses,
        pass.barcodes.len()
    );
    log::info!(
        "Timing: layout={:.1}ms, write={:.1}ms, total={:.1}ms ({} records, {} pages, output {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        records.len(),
        pages.len(),
        bytes.len(),
    );

    Ok(bytes)
}
