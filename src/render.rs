//! # Document Assembly
//!
//! Drives the grid and the card composer over the record sequence and
//! collects the resulting pages.
//!
//! A [`RenderPass`] owns everything that is mutable during a render: the
//! shaping memo and the barcode memo. It borrows the fonts, so a pass can
//! never mix caches from two different font families. Create one per
//! document and drop it afterwards.

use crate::barcode::BarcodeCache;
use crate::config::LabelLayout;
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::layout::card::CardComposer;
use crate::layout::Page;
use crate::model::LabelRecord;
use crate::text::TextFitter;

/// Per-document render state.
#[derive(Debug)]
pub struct RenderPass<'a> {
    pub text: TextFitter<'a>,
    pub barcodes: BarcodeCache,
}

impl<'a> RenderPass<'a> {
    pub fn new(fonts: &'a FontContext) -> Self {
        Self {
            text: TextFitter::new(fonts),
            barcodes: BarcodeCache::new(),
        }
    }

    pub fn fonts(&self) -> &'a FontContext {
        self.text.fonts()
    }
}

/// What to produce.
#[derive(Debug, Clone, Copy, Default)]
pub enum RenderMode<'i> {
    /// Every record, as many pages as needed.
    #[default]
    Full,
    /// Only the first page's worth of records, optionally over a scanned
    /// template of the pre-printed stock.
    Preview { background: Option<&'i LoadedImage> },
}

/// Lay out `records` into pages.
///
/// Always returns at least one page; an empty record list gives a single
/// blank page (with the template, in preview mode).
pub fn layout_pages(
    records: &[LabelRecord],
    layout: &LabelLayout,
    pass: &RenderPass<'_>,
    mode: RenderMode<'_>,
) -> Vec<Page> {
    let grid = &layout.grid;
    let (records, background) = match mode {
        RenderMode::Full => (records, None),
        RenderMode::Preview { background } => {
            let take = records.len().min(grid.cards_per_page());
            (&records[..take], background)
        }
    };

    let composer = CardComposer::new(&layout.card, pass);
    let mut pages = vec![Page::new(0, grid.page_width, grid.page_height)];
    pages[0].background = background.cloned();

    for (index, record) in records.iter().enumerate() {
        if grid.starts_page(index) {
            log::debug!(
                "Page {} complete with {} cards",
                pages.len(),
                pages.last().map(|p| p.cards).unwrap_or(0)
            );
            pages.push(Page::new(pages.len(), grid.page_width, grid.page_height));
        }

        let anchor = grid.place(index);
        let mut ops = composer.compose(record, anchor.width, anchor.height, layout.debug_borders);
        for op in &mut ops {
            op.translate(anchor.origin.x, anchor.origin.y);
        }

        if let Some(page) = pages.last_mut() {
            page.ops.extend(ops);
            page.cards += 1;
        }
    }

    pages
}
