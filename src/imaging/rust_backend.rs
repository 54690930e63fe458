//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format detection | `image::guess_format` (magic bytes, not the key's extension) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory_with_format` |
//! | Fit | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Crop-to-fill | `calculate_fill_dimensions` + `resize_exact` (`Lanczos3`) + centered `crop_imm` |
//! | Encode | optimized encoder for JPEG/PNG, then `DynamicImage::write_to` as fallback |
//!
//! Outputs are always written in the source's own format.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_fill_dimensions;
use super::params::{FillParams, FitParams, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, CompressionType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_format(source: &[u8]) -> Result<ImageFormat, BackendError> {
    if source.is_empty() {
        return Err(BackendError::Decode("source is empty".into()));
    }
    image::guess_format(source)
        .map_err(|e| BackendError::Decode(format!("unrecognized image format: {e}")))
}

/// Decode an image from memory, returning it with its detected format.
fn load_image(source: &[u8]) -> Result<(DynamicImage, ImageFormat), BackendError> {
    let format = detect_format(source)?;
    let img = image::load_from_memory_with_format(source, format)
        .map_err(|e| BackendError::Decode(format!("{format:?}: {e}")))?;
    Ok((img, format))
}

/// Encode with the format's size-optimized settings, if it has any.
///
/// Returns `None` for formats without a dedicated optimized path.
fn encode_optimized(
    img: &DynamicImage,
    format: ImageFormat,
    quality: Quality,
) -> Option<Result<Vec<u8>, image::ImageError>> {
    let mut buf = Vec::new();
    let result = match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            img.write_with_encoder(encoder)
        }
        ImageFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut buf,
                CompressionType::Best,
                png::FilterType::Adaptive,
            );
            img.write_with_encoder(encoder)
        }
        _ => return None,
    };
    Some(result.map(|()| buf))
}

/// Encode `img` as `format`, trying the optimized encoder first.
fn save_image(
    img: &DynamicImage,
    format: ImageFormat,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    match encode_optimized(img, format, quality) {
        Some(Ok(bytes)) => return Ok(bytes),
        Some(Err(e)) => {
            debug!(?format, error = %e, "optimized encode failed, using default encoder");
        }
        None => {}
    }

    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format)
        .map_err(|e| BackendError::Encode(format!("{format:?}: {e}")))?;
    Ok(cursor.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError> {
        let format = detect_format(source)?;
        let (width, height) = ImageReader::with_format(Cursor::new(source), format)
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn fit(&self, source: &[u8], params: &FitParams) -> Result<Vec<u8>, BackendError> {
        let (img, format) = load_image(source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, format, params.quality)
    }

    fn fill(&self, source: &[u8], params: &FillParams) -> Result<Vec<u8>, BackendError> {
        let (img, format) = load_image(source)?;

        // Cover-resize, then center-crop the overflow on the longer axis
        let (fill_w, fill_h) = calculate_fill_dimensions(
            (img.width(), img.height()),
            (params.crop_width, params.crop_height),
        );
        let covered = img.resize_exact(fill_w, fill_h, FilterType::Lanczos3);
        let filled = covered.crop_imm(
            (fill_w - params.crop_width) / 2,
            (fill_h - params.crop_height) / 2,
            params.crop_width,
            params.crop_height,
        );

        save_image(&filled, format, params.quality)
    }
}
