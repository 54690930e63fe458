//! Shared test utilities for the image-variants test suite.
//!
//! Builds synthetic encoded images in memory and parses size tuples from
//! TOML snippets, so tests don't depend on fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = jpeg_bytes(200, 100);
//! let (img, format) = decode(&source);
//! assert_eq!((img.width(), img.height()), (200, 100));
//!
//! let sizes = raw_sizes(r#"[["thumb", 64, 64], [640, 0]]"#);
//! ```

use image::{DynamicImage, ImageEncoder, ImageFormat, RgbImage};

use crate::sizes::RawSize;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode a `width`x`height` gradient as JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a `width`x`height` gradient as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a `width`x`height` gradient as TIFF (no optimized encoder path).
pub fn tiff_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(gradient(width, height));
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Tiff).unwrap();
    cursor.into_inner()
}

/// Decode encoded bytes, returning the image and its detected format.
pub fn decode(bytes: &[u8]) -> (DynamicImage, ImageFormat) {
    let format = image::guess_format(bytes).expect("output should have a recognizable format");
    let img = image::load_from_memory_with_format(bytes, format).unwrap();
    (img, format)
}

// =========================================================================
// Size tuples
// =========================================================================

/// Parse a TOML array literal into a [`RawSize`].
///
/// `raw_sizes(r#"[["default", 640, 480, true], [640, 0]]"#)`
pub fn raw_sizes(toml_array: &str) -> RawSize {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        sizes: RawSize,
    }
    let wrapper: Wrapper = toml::from_str(&format!("sizes = {toml_array}")).unwrap();
    wrapper.sizes
}
