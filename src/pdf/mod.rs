//! # PDF Serializer
//!
//! Writes laid-out label pages as a PDF 1.7 file. The writer is
//! self-contained: objects are assembled as raw bytes, content streams are
//! zlib-compressed with miniz_oxide, and the xref table is computed at the
//! end.
//!
//! ## Object layout
//!
//! ```text
//! 1        Catalog
//! 2        Pages
//! 3..      fonts (Type1, or the five CIDFont objects per embedded face)
//! ..       template image XObjects
//! ..       per page: content stream, page dictionary
//! last     Info
//! ```
//!
//! Output is deterministic: fonts, glyph tables, and CMaps are emitted in
//! sorted order and no timestamps are written.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::{EmbeddedFont, FontFace, FontSlot, Weight};
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::layout::{BarcodeRun, Color, DrawOp, Page, Point};
use crate::render::RenderPass;
use crate::text::shaping::GlyphRun;

/// Serializes pages to PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    /// Stroke width for synthetic bold.
    bold_stroke: f64,
    title: Option<String>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font resource objects, by slot.
    fonts: BTreeMap<FontSlot, usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }

    /// Push a stream object with the given extra dictionary entries.
    fn push_stream(&mut self, dict_entries: &str, raw: &[u8]) -> usize {
        let compressed = compress_to_vec_zlib(raw, 6);
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Length {}{} /Filter /FlateDecode >>\nstream\n",
            compressed.len(),
            dict_entries
        );
        data.extend_from_slice(&compressed);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

/// Glyphs used from one face: glyph id -> source char.
type GlyphUsage = BTreeMap<u16, char>;

impl PdfWriter {
    pub fn new(bold_stroke: f64) -> Self {
        Self {
            bold_stroke,
            title: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Write pages to a PDF byte vector. Text is shaped through `pass`.
    pub fn write(&self, pages: &[Page], pass: &RenderPass<'_>) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            fonts: BTreeMap::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);

        self.register_fonts(&mut builder, pages, pass);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages {
            let image_id = page
                .background
                .as_ref()
                .map(|image| Self::write_image_xobject(&mut builder, image));

            let content = self.build_content_stream(page, pass, image_id.is_some());
            let content_id = builder.push_stream("", content.as_bytes());

            let xobjects = image_id
                .map(|id| format!(" /XObject << /Im0 {} 0 R >>", id))
                .unwrap_or_default();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >>{} >> >>",
                page.width,
                page.height,
                content_id,
                Self::font_resource_dict(&builder),
                xobjects
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: Vec<String> = page_obj_ids.iter().map(|id| format!("{} 0 R", id)).collect();
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(title) = &self.title {
            let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
        }
        info.push_str("/Producer (labelsheet) /Creator (labelsheet) >>");
        let info_id = builder.push(info.into_bytes());

        Self::serialize(&builder, info_id)
    }

    // ─── Text ───────────────────────────────────────────────────────

    /// Every text fragment on the pages with the weight it is drawn in.
    fn text_fragments<'p>(pages: &'p [Page]) -> impl Iterator<Item = (&'p str, Weight)> {
        pages.iter().flat_map(|page| page.ops.iter()).flat_map(|op| {
            let fragments: Vec<(&str, Weight)> = match op {
                DrawOp::Text(run) => vec![(run.content.as_str(), run.weight)],
                DrawOp::Wrapped(block) => block
                    .lines
                    .iter()
                    .map(|line| (line.as_str(), block.weight))
                    .collect(),
                DrawOp::Barcode(_) | DrawOp::DebugRect { .. } => vec![],
            };
            fragments
        })
    }

    /// Write font objects for every slot that draws at least one glyph.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[Page], pass: &RenderPass<'_>) {
        let fonts = pass.fonts();
        let mut usage: BTreeMap<FontSlot, GlyphUsage> = BTreeMap::new();
        for (text, weight) in Self::text_fragments(pages) {
            if text.is_empty() {
                continue;
            }
            let slot = fonts.resolve(weight).slot;
            let used = usage.entry(slot).or_default();
            for glyph in &pass.text.shape(text, weight).glyphs {
                used.entry(glyph.glyph_id).or_insert(glyph.ch);
            }
        }

        for (slot, used) in &usage {
            let id = match fonts.face(*slot) {
                FontFace::Standard(font) => builder.push(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    )
                    .into_bytes(),
                ),
                FontFace::Embedded(font) => Self::write_embedded_font(builder, font, used),
            };
            builder.fonts.insert(*slot, id);
        }
    }

    /// Write the five CIDFont objects for an embedded TrueType face and
    /// return the Type0 root. The whole font program is embedded.
    fn write_embedded_font(builder: &mut PdfBuilder, font: &EmbeddedFont, used: &GlyphUsage) -> usize {
        let fontfile2_id = builder.push_stream(&format!(" /Length1 {}", font.data.len()), &font.data);

        let scale = 1000.0 / font.units_per_em.max(1) as f64;
        let (x_min, y_min, x_max, y_max) = font.bbox;
        let descriptor = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox [{} {} {} {}] /ItalicAngle 0 \
             /Ascent {} /Descent {} /CapHeight {} /StemV 80 \
             /FontFile2 {} 0 R >>",
            font.name,
            (x_min as f64 * scale) as i32,
            (y_min as f64 * scale) as i32,
            (x_max as f64 * scale) as i32,
            (y_max as f64 * scale) as i32,
            (font.ascender as f64 * scale) as i32,
            (font.descender as f64 * scale) as i32,
            (font.cap_height as f64 * scale) as i32,
            fontfile2_id,
        );
        let descriptor_id = builder.push(descriptor.into_bytes());

        let cidfont = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} /CIDToGIDMap /Identity >>",
            font.name,
            descriptor_id,
            font.glyph_width_1000(0).round() as u32,
            build_w_array(font, used),
        );
        let cidfont_id = builder.push(cidfont.into_bytes());

        let tounicode_id = builder.push_stream("", build_tounicode_cmap(used, &font.name).as_bytes());

        let type0 = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] /ToUnicode {} 0 R >>",
            font.name, cidfont_id, tounicode_id,
        );
        builder.push(type0.into_bytes())
    }

    fn font_resource_dict(builder: &PdfBuilder) -> String {
        builder
            .fonts
            .iter()
            .map(|(slot, id)| format!("/F{} {} 0 R", *slot as usize, id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ─── Content ────────────────────────────────────────────────────

    fn build_content_stream(&self, page: &Page, pass: &RenderPass<'_>, has_background: bool) -> String {
        let mut stream = String::new();

        if has_background {
            let _ = writeln!(
                stream,
                "q\n{:.4} 0 0 {:.4} 0 0 cm\n/Im0 Do\nQ",
                page.width, page.height
            );
        }

        for op in &page.ops {
            match op {
                DrawOp::Text(run) => {
                    self.write_text(&mut stream, pass, &run.content, run.weight, run.size, run.color, run.origin);
                }
                DrawOp::Wrapped(block) => {
                    for (i, line) in block.lines.iter().enumerate() {
                        let width = pass.text.measure_width(line, block.weight, block.size);
                        let origin = Point::new(
                            block.origin.x - width / 2.0,
                            block.origin.y - i as f64 * block.line_spacing,
                        );
                        self.write_text(&mut stream, pass, line, block.weight, block.size, block.color, origin);
                    }
                }
                DrawOp::Barcode(bar) => Self::write_barcode(&mut stream, bar),
                DrawOp::DebugRect { origin, width, height } => {
                    let _ = writeln!(
                        stream,
                        "q\n0.5 w\n0.6 0.6 0.6 RG\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ",
                        origin.x, origin.y, width, height
                    );
                }
            }
        }

        stream
    }

    /// One text run, always inside its own q/Q pair so fill color, stroke
    /// color, line width, and rendering mode never leak into the next op.
    #[allow(clippy::too_many_arguments)]
    fn write_text(
        &self,
        stream: &mut String,
        pass: &RenderPass<'_>,
        text: &str,
        weight: Weight,
        size: f64,
        color: Color,
        origin: Point,
    ) {
        if text.is_empty() {
            return;
        }
        let resolved = pass.fonts().resolve(weight);
        let run = pass.text.shape(text, weight);
        if run.is_empty() {
            return;
        }

        let _ = writeln!(stream, "q\n{:.3} {:.3} {:.3} rg", color.r, color.g, color.b);
        if resolved.synthetic_bold {
            let _ = writeln!(
                stream,
                "{:.3} {:.3} {:.3} RG\n{:.2} w\n2 Tr",
                color.r, color.g, color.b, self.bold_stroke
            );
        }
        let _ = writeln!(
            stream,
            "BT\n/F{} {:.2} Tf\n{:.2} {:.2} Td\n{} Tj\nET\nQ",
            resolved.slot as usize,
            size,
            origin.x,
            origin.y,
            encode_glyphs(&run, resolved.face.is_embedded())
        );
    }

    /// Bars as filled rectangles, adjacent dark modules merged.
    fn write_barcode(stream: &mut String, bar: &BarcodeRun) {
        let symbol = &bar.symbol;
        let _ = writeln!(stream, "q\n0 0 0 rg");
        for (start, count) in symbol.bars() {
            let _ = writeln!(
                stream,
                "{:.3} {:.2} {:.3} {:.2} re",
                bar.origin.x + start as f64 * symbol.module_width,
                bar.origin.y,
                count as f64 * symbol.module_width,
                symbol.bar_height
            );
        }
        let _ = writeln!(stream, "f\nQ");
    }

    // ─── Images ─────────────────────────────────────────────────────

    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let mut obj: Vec<u8> = Vec::new();
                let _ = write!(
                    obj,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space.pdf_name(),
                    data.len()
                );
                obj.extend_from_slice(data);
                obj.extend_from_slice(b"\nendstream");
                builder.push(obj)
            }
            ImagePixelData::Rgb(rgb) => builder.push_stream(
                &format!(
                    " /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8",
                    image.width_px, image.height_px
                ),
                rgb,
            ),
        }
    }

    // ─── File ───────────────────────────────────────────────────────

    fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );
        output
    }
}

/// Glyph ids as a PDF string operand: 2-byte hex for embedded faces,
/// an escaped WinAnsi literal for standard ones.
fn encode_glyphs(run: &GlyphRun, embedded: bool) -> String {
    let mut out = String::new();
    if embedded {
        out.push('<');
        for glyph in &run.glyphs {
            let _ = write!(out, "{:04X}", glyph.glyph_id);
        }
        out.push('>');
        return out;
    }

    out.push('(');
    for glyph in &run.glyphs {
        let b = glyph.glyph_id as u8;
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out.push(')');
    out
}

/// Escape special characters in a PDF literal string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

/// The /W array: `[gid [width] gid [width] ...]`, sorted by glyph id.
fn build_w_array(font: &EmbeddedFont, used: &GlyphUsage) -> String {
    let mut result = String::from("[");
    for gid in used.keys() {
        let _ = write!(result, " {} [{}]", gid, font.glyph_width_1000(*gid).round() as u32);
    }
    result.push_str(" ]");
    result
}

/// ToUnicode CMap so text can be searched and copied out of the sheet.
fn build_tounicode_cmap(used: &GlyphUsage, font_name: &str) -> String {
    let mut cmap = String::new();
    cmap.push_str("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n");
    cmap.push_str("/CIDSystemInfo\n<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
    cmap.push_str("/CMapType 2 def\n1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    let entries: Vec<(&u16, &char)> = used.iter().collect();
    // beginbfchar blocks hold at most 100 entries
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            let _ = writeln!(cmap, "<{:04X}> <{}>", gid, utf16);
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::BarcodeCache;
    use crate::font::{FontContext, StandardFont};
    use crate::layout::TextRun;
    use crate::text::shaping::ShapedGlyph;

    fn page_with(ops: Vec<DrawOp>) -> Page {
        let mut page = Page::new(0, 595.28, 841.89);
        page.ops = ops;
        page
    }

    fn text_op(content: &str, weight: Weight) -> DrawOp {
        DrawOp::Text(TextRun {
            content: content.to_string(),
            origin: Point::new(50.0, 700.0),
            weight,
            size: 12.0,
            color: Color::BLACK,
        })
    }

    fn contents(page: &Page, fonts: &FontContext) -> String {
        let pass = RenderPass::new(fonts);
        PdfWriter::new(0.6).build_content_stream(page, &pass, false)
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let fonts = FontContext::standard();
        let pass = RenderPass::new(&fonts);
        let bytes = PdfWriter::new(0.6).write(&[page_with(vec![])], &pass);

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
    }

    #[test]
    fn test_title_in_info() {
        let fonts = FontContext::standard();
        let pass = RenderPass::new(&fonts);
        let bytes = PdfWriter::new(0.6)
            .with_title("Offers (week 12)")
            .write(&[page_with(vec![])], &pass);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Offers \\(week 12\\))"));
    }

    #[test]
    fn test_bold_font_registered_separately() {
        let fonts = FontContext::standard();
        let pass = RenderPass::new(&fonts);
        let page = page_with(vec![text_op("Rice", Weight::Regular), text_op("Brand", Weight::Bold)]);
        let bytes = PdfWriter::new(0.6).write(&[page], &pass);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/F0 "));
        assert!(text.contains("/F1 "));
    }

    #[test]
    fn test_unused_fonts_not_written() {
        let fonts = FontContext::standard();
        let pass = RenderPass::new(&fonts);
        let page = page_with(vec![text_op("Rice", Weight::Regular), text_op("", Weight::Bold)]);
        let bytes = PdfWriter::new(0.6).write(&[page], &pass);
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("Helvetica-Bold"));
    }

    #[test]
    fn test_text_run_is_isolated() {
        let fonts = FontContext::standard();
        let stream = contents(&page_with(vec![text_op("A(b)", Weight::Regular)]), &fonts);
        assert_eq!(
            stream,
            "q\n0.000 0.000 0.000 rg\nBT\n/F0 12.00 Tf\n50.00 700.00 Td\n(A\\(b\\)) Tj\nET\nQ\n"
        );
    }

    #[test]
    fn test_synthetic_bold_fills_and_strokes() {
        let fonts = FontContext::standard().without_bold();
        let stream = contents(&page_with(vec![text_op("Sale", Weight::Bold)]), &fonts);
        assert_eq!(
            stream,
            "q\n0.000 0.000 0.000 rg\n0.000 0.000 0.000 RG\n0.60 w\n2 Tr\n\
             BT\n/F0 12.00 Tf\n50.00 700.00 Td\n(Sale) Tj\nET\nQ\n"
        );
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let fonts = FontContext::standard();
        assert!(contents(&page_with(vec![text_op("", Weight::Regular)]), &fonts).is_empty());
    }

    #[test]
    fn test_barcode_rects() {
        let cache = BarcodeCache::new();
        let symbol = cache.symbol("42", 1.0, 20.0).unwrap();
        let bars = symbol.bars().len();
        let op = DrawOp::Barcode(BarcodeRun {
            code: "42".to_string(),
            origin: Point::new(10.0, 20.0),
            symbol,
        });
        let stream = contents(&page_with(vec![op]), &FontContext::standard());
        assert_eq!(stream.matches(" re\n").count(), bars);
        assert!(stream.starts_with("q\n0 0 0 rg\n10.000 20.00 "));
        assert!(stream.ends_with("f\nQ\n"));
    }

    #[test]
    fn test_debug_rect_stroked() {
        let op = DrawOp::DebugRect {
            origin: Point::new(1.0, 2.0),
            width: 3.0,
            height: 4.0,
        };
        let stream = contents(&page_with(vec![op]), &FontContext::standard());
        assert!(stream.contains("1.00 2.00 3.00 4.00 re\nS"));
    }

    #[test]
    fn test_background_drawn_first() {
        let fonts = FontContext::standard();
        let pass = RenderPass::new(&fonts);
        let mut page = page_with(vec![text_op("Rice", Weight::Regular)]);
        page.background = Some(LoadedImage {
            pixel_data: ImagePixelData::Rgb(vec![255; 2 * 2 * 3]),
            width_px: 2,
            height_px: 2,
        });
        let bytes = PdfWriter::new(0.6).write(&[page.clone()], &pass);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/XObject << /Im0 "));
        assert!(text.contains("/Subtype /Image /Width 2 /Height 2"));

        let stream = PdfWriter::new(0.6).build_content_stream(&page, &pass, true);
        assert!(stream.starts_with("q\n595.2800 0 0 841.8900 0 0 cm\n/Im0 Do\nQ\n"));
    }

    #[test]
    fn test_deterministic_output() {
        let fonts = FontContext::standard();
        let page = page_with(vec![text_op("Rice", Weight::Regular), text_op("Brand", Weight::Bold)]);
        let a = PdfWriter::new(0.6).write(&[page.clone()], &RenderPass::new(&fonts));
        let b = PdfWriter::new(0.6).write(&[page], &RenderPass::new(&fonts));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hex_glyph_encoding() {
        let run = GlyphRun {
            glyphs: vec![
                ShapedGlyph { glyph_id: 0x0041, advance: 0.5, ch: 'A' },
                ShapedGlyph { glyph_id: 0x01F3, advance: 0.5, ch: 'ب' },
            ],
        };
        assert_eq!(encode_glyphs(&run, true), "<004101F3>");
    }

    #[test]
    fn test_standard_font_uses_octal_for_high_bytes() {
        let run = crate::text::shaping::shape("café", &FontFace::Standard(StandardFont::Helvetica));
        assert_eq!(encode_glyphs(&run, false), "(caf\\351)");
    }

    #[test]
    fn test_tounicode_cmap_format() {
        let mut used = GlyphUsage::new();
        used.insert(3, 'A');
        used.insert(7, '\u{1F600}');
        let cmap = build_tounicode_cmap(&used, "TestFont");
        assert!(cmap.contains("/CMapName /TestFont-UTF16 def"));
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0003> <0041>"));
        assert!(cmap.contains("<0007> <D83DDE00>"));
    }
}
