//! Shared test utilities: synthetic image writers.
//!
//! Every writer encodes a fresh image with the `image` crate so tests never
//! depend on checked-in binary fixtures.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("logo.png");
//! write_png_rgb(&path, 100, 50);
//! ```

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use std::path::Path;

// =========================================================================
// PNG
// =========================================================================

/// Opaque 8-bit RGB PNG with a gradient.
pub fn write_png_rgb(path: &Path, width: u32, height: u32) {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
    .save_with_format(path, ImageFormat::Png)
    .unwrap();
}

/// 8-bit RGBA PNG whose alpha fades left to right.
pub fn write_png_rgba(path: &Path, width: u32, height: u32) {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, (x * 255 / width.max(1)) as u8])
    })
    .save_with_format(path, ImageFormat::Png)
    .unwrap();
}

/// 8-bit grayscale PNG.
pub fn write_png_gray(path: &Path, width: u32, height: u32) {
    GrayImage::from_fn(width, height, |x, y| image::Luma([((x + y) % 256) as u8]))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// The first `len` bytes of a valid PNG.
pub fn write_truncated_png(path: &Path, len: usize) {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(16, 16))
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    std::fs::write(path, &bytes[..len.min(bytes.len())]).unwrap();
}

// =========================================================================
// Other formats
// =========================================================================

/// RGB image of pseudo-random pixels in `format`. Noise barely compresses,
/// so a byte cut lands inside pixel data rather than in trailing metadata.
pub fn write_noise(path: &Path, width: u32, height: u32, format: ImageFormat) {
    let mut state: u32 = 0x2545_f491;
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        };
        image::Rgb([next(), next(), next()])
    })
    .save_with_format(path, format)
    .unwrap();
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
    .save_with_format(path, ImageFormat::Jpeg)
    .unwrap();
}

/// AVIF through the `image` crate's rav1e encoder (fastest speed).
pub fn write_avif(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 10, 80);
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .unwrap();
}
