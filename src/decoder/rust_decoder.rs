//! Pure Rust decoder built on the `image` crate ecosystem.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Format sniffing | `image::ImageReader::with_guessed_format` (magic bytes, extension fallback) |
//! | Header (PNG, JPEG, GIF, BMP, ICO, TIFF, WebP) | `ImageReader::into_decoder` |
//! | Full decode (same formats) | `ImageReader::decode` |
//! | JPEG end-of-stream check | marker walk, see [`super::jpeg`] |
//! | AVIF header + decode | `avif-parse` + `rav1d`, see [`super::avif`] |
//! | Resource caps | `image::Limits` built from [`DecodeLimits`] |

use super::{avif, jpeg};
use super::backend::{ColorMode, DecodeError, DecodeLimits, Dimensions, ImageDecoder, ImageHandle};
use image::ImageDecoder as _;
use image::{ColorType, ImageFormat, ImageReader, Limits};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Production decoder. See the [module docs](self) for the crate mapping.
#[derive(Debug, Default)]
pub struct RustDecoder {
    limits: DecodeLimits,
}

impl RustDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    /// Open `path` with the format sniffed from its leading bytes.
    fn reader(&self, path: &Path) -> Result<ImageReader<BufReader<File>>, DecodeError> {
        let mut reader = ImageReader::open(path)?.with_guessed_format()?;
        reader.limits(image_limits(&self.limits));
        Ok(reader)
    }
}

fn image_limits(limits: &DecodeLimits) -> Limits {
    let mut out = Limits::no_limits();
    out.max_image_width = limits.max_width;
    out.max_image_height = limits.max_height;
    out.max_alloc = limits.max_alloc;
    out
}

/// Container format identifier as printed in reports.
pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "PNG".into(),
        ImageFormat::Jpeg => "JPEG".into(),
        ImageFormat::Gif => "GIF".into(),
        ImageFormat::Bmp => "BMP".into(),
        ImageFormat::Ico => "ICO".into(),
        ImageFormat::Tiff => "TIFF".into(),
        ImageFormat::WebP => "WEBP".into(),
        ImageFormat::Avif => avif::FORMAT_NAME.into(),
        other => format!("{other:?}").to_uppercase(),
    }
}

impl From<ColorType> for ColorMode {
    fn from(color: ColorType) -> Self {
        match color {
            ColorType::L8 => ColorMode::L,
            ColorType::La8 => ColorMode::La,
            ColorType::Rgb8 => ColorMode::Rgb,
            ColorType::Rgba8 => ColorMode::Rgba,
            ColorType::L16 => ColorMode::L16,
            ColorType::La16 => ColorMode::La16,
            ColorType::Rgb16 => ColorMode::Rgb16,
            ColorType::Rgba16 => ColorMode::Rgba16,
            ColorType::Rgb32F => ColorMode::Rgb32F,
            ColorType::Rgba32F => ColorMode::Rgba32F,
            other => ColorMode::Other(format!("{other:?}")),
        }
    }
}

impl ImageDecoder for RustDecoder {
    fn open(&self, path: &Path) -> Result<ImageHandle, DecodeError> {
        let reader = self.reader(path)?;
        let format = reader
            .format()
            .ok_or_else(|| DecodeError::Unsupported(path.display().to_string()))?;
        if format == ImageFormat::Avif {
            return avif::open(path, &self.limits);
        }

        let decoder = reader.into_decoder()?;
        let (width, height) = decoder.dimensions();
        let size = Dimensions { width, height };
        let mode = ColorMode::from(decoder.color_type());
        self.limits.check(size, &mode)?;
        Ok(ImageHandle::new(path, format_name(format), size, mode))
    }

    fn verify(&self, handle: &ImageHandle) -> Result<(), DecodeError> {
        if handle.format() == avif::FORMAT_NAME {
            return avif::verify(handle, &self.limits);
        }

        let image = self.reader(handle.path())?.decode()?;
        let decoded = Dimensions {
            width: image.width(),
            height: image.height(),
        };
        if decoded != handle.size() {
            return Err(DecodeError::Corrupt(format!(
                "decoded image is {}x{} but the header declares {}x{}",
                decoded.width,
                decoded.height,
                handle.size().width,
                handle.size().height
            )));
        }
        if handle.format() == format_name(ImageFormat::Jpeg) {
            jpeg::check_complete(&std::fs::read(handle.path())?)?;
        }
        Ok(())
    }
}
