//! # Screenshot Loading
//!
//! Resolves a screenshot source — data URI, raw base64, or file path — to
//! bytes, then prepares them for PDF embedding. JPEG bytes pass straight
//! through (PDF readers decode DCTDecode natively), so a report full of
//! camera-sized screenshots never holds their pixels in memory. PNGs are
//! decoded to RGB with the alpha channel split off for an SMask.

use std::io::Cursor;

use base64::Engine as _;

use crate::error::ImageError;

/// An image ready for placement and PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    /// Intrinsic width in pixels, used for aspect-preserving scaling.
    pub width_px: u32,
    /// Intrinsic height in pixels.
    pub height_px: u32,
}

/// Pixel data in a form the PDF serializer embeds directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB triplets plus an optional alpha channel for an SMask.
    Decoded {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

/// The /ColorSpace a passthrough JPEG declares.
#[derive(Debug, Clone, Copy)]
pub enum JpegColorSpace {
    DeviceRgb,
    DeviceGray,
}

enum SniffedFormat {
    Jpeg,
    Png,
}

/// Load an image from a source string.
///
/// Accepted forms, in the order they are tried:
/// - `data:image/...;base64,...` data URIs,
/// - explicit file paths (`/`, `./`, `../`) — not available under WASM,
/// - raw base64.
pub fn load_image(src: &str) -> Result<LoadedImage, ImageError> {
    let bytes = resolve_source(src)?;
    match sniff_format(&bytes) {
        Some(SniffedFormat::Jpeg) => passthrough_jpeg(bytes),
        Some(SniffedFormat::Png) => decode_png(&bytes),
        None => Err(ImageError::UnknownFormat),
    }
}

fn resolve_source(src: &str) -> Result<Vec<u8>, ImageError> {
    if let Some(rest) = src.strip_prefix("data:") {
        let comma = rest.find(',').ok_or(ImageError::MalformedDataUri)?;
        return Ok(base64::engine::general_purpose::STANDARD.decode(&rest[comma + 1..])?);
    }

    // Only explicit path prefixes are treated as paths; base64 payloads
    // contain '/' and must not be mistaken for them.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(src).map_err(|source| ImageError::Io {
                path: src.to_string(),
                source,
            });
        }
        #[cfg(target_arch = "wasm32")]
        {
            return Err(ImageError::UnsupportedSource(format!(
                "file path '{src}' (use a data URI or base64)"
            )));
        }
    }

    Ok(base64::engine::general_purpose::STANDARD.decode(src)?)
}

fn sniff_format(data: &[u8]) -> Option<SniffedFormat> {
    match data {
        [0xFF, 0xD8, ..] => Some(SniffedFormat::Jpeg),
        [0x89, b'P', b'N', b'G', ..] => Some(SniffedFormat::Png),
        _ => None,
    }
}

/// JPEG: probe dimensions and color space without touching the pixels.
fn passthrough_jpeg(data: Vec<u8>) -> Result<LoadedImage, ImageError> {
    let mut reader = image::io::Reader::new(Cursor::new(data.as_slice()));
    reader.set_format(image::ImageFormat::Jpeg);
    let (width_px, height_px) = reader.into_dimensions()?;

    let color_space = jpeg_color_space(&data);
    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg { data, color_space },
        width_px,
        height_px,
    })
}

/// Walk the JPEG marker segments to the SOF header and read the component
/// count: one component means grayscale, anything else is treated as RGB.
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // past the SOI marker
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            return match data.get(i + 9) {
                Some(&1) => JpegColorSpace::DeviceGray,
                _ => JpegColorSpace::DeviceRgb,
            };
        }
        let segment_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + segment_len;
    }
    JpegColorSpace::DeviceRgb
}

/// PNG: decode fully, keep RGB, split alpha off when any pixel needs it.
fn decode_png(data: &[u8]) -> Result<LoadedImage, ImageError> {
    let mut reader = image::io::Reader::new(Cursor::new(data));
    reader.set_format(image::ImageFormat::Png);
    let rgba = reader.decode()?.to_rgba8();

    let (width_px, height_px) = (rgba.width(), rgba.height());
    let pixel_count = (width_px * height_px) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let alpha = if alpha.iter().all(|&a| a == 255) {
        None
    } else {
        Some(alpha)
    };

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded { rgb, alpha },
        width_px,
        height_px,
    })
}
