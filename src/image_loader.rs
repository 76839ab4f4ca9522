//! # Template Images
//!
//! Loads the scanned sheet used as a preview background. Sources can be a
//! file path, a `data:image/...;base64,` URI, or bare base64.
//!
//! JPEG scans are embedded as-is (DCTDecode). PNG scans are decoded and any
//! transparency is flattened onto white, since the image always sits at the
//! bottom of the page.

use std::io::Cursor;
use std::path::Path;

use crate::error::LabelError;

/// An image ready for PDF embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// Pixel data in a form the PDF writer can consume directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixelData {
    /// Raw JPEG bytes.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// width * height * 3 bytes, RGB.
    Rgb(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl JpegColorSpace {
    pub fn pdf_name(self) -> &'static str {
        match self {
            JpegColorSpace::DeviceRGB => "/DeviceRGB",
            JpegColorSpace::DeviceGray => "/DeviceGray",
        }
    }
}

/// Load a template from a path, data URI, or base64 string.
pub fn load_image(src: &str) -> Result<LoadedImage, LabelError> {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("data:image/") {
        let comma = rest
            .find(',')
            .ok_or_else(|| LabelError::Image("Invalid data URI: missing comma".to_string()))?;
        return decode_image_bytes(&base64_decode(&rest[comma + 1..])?);
    }
    let path = Path::new(src);
    if path.exists() {
        return load_image_file(path);
    }
    base64_decode(src)
        .and_then(|bytes| decode_image_bytes(&bytes))
        .map_err(|_| LabelError::Image(format!("'{}' is neither a readable file nor image data", src)))
}

/// Load a template from disk.
pub fn load_image_file(path: &Path) -> Result<LoadedImage, LabelError> {
    let data = std::fs::read(path).map_err(|e| {
        LabelError::Image(format!("Failed to read image file '{}': {}", path.display(), e))
    })?;
    decode_image_bytes(&data)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, LabelError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| LabelError::Image(format!("Base64 decode error: {}", e)))
}

/// Detect the format from magic bytes and decode.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, LabelError> {
    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(LabelError::Image(
            "Unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47]
}

fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, LabelError> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| LabelError::Image(format!("JPEG format detection error: {}", e)))?
        .into_dimensions()
        .map_err(|e| LabelError::Image(format!("Failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Component count from the first SOF segment; RGB when it can't be found.
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        let segment = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + segment;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> Result<LoadedImage, LabelError> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| LabelError::Image(format!("PNG format detection error: {}", e)))?
        .decode()
        .map_err(|e| LabelError::Image(format!("Failed to decode PNG: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let alpha = pixel[3] as u32;
        for channel in &pixel.0[..3] {
            // Composite over white
            let value = (*channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(value as u8);
        }
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Rgb(rgb),
        width_px: width,
        height_px: height,
    })
}
