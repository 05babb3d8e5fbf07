//! Image decoder trait and shared types.
//!
//! The [`ImageDecoder`] trait is the only thing the verifier knows about
//! image parsing. It splits decoding into the two passes the verifier needs:
//!
//! | Pass | Method | Fails on |
//! |---|---|---|
//! | Header | [`ImageDecoder::open`] | unrecognised container, malformed header, I/O |
//! | Payload | [`ImageDecoder::verify`] | truncated or corrupt pixel data, size mismatch |
//!
//! The production implementation is
//! [`RustDecoder`](super::rust_decoder::RustDecoder).

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Image(#[from] image::ImageError),
    #[error("cannot identify image file {0}")]
    Unsupported(String),
    #[error("{0}")]
    Corrupt(String),
    #[error("image exceeds decoder limits: {0}")]
    LimitExceeded(String),
}

/// Pixel dimensions as reported by a decoder.
///
/// Displays as `(width, height)`, the form used in report lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.width, self.height)
    }
}

/// Channel and bit-depth layout of decoded pixel data.
///
/// Names follow the usual short mode codes: `L` is single-channel luma,
/// a `;16` suffix marks 16 bits per channel and `;32F` marks float samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorMode {
    L,
    La,
    Rgb,
    Rgba,
    L16,
    La16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
    /// A layout the decoder reports that has no short code here.
    Other(String),
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ColorMode::L => "L",
            ColorMode::La => "LA",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
            ColorMode::L16 => "I;16",
            ColorMode::La16 => "LA;16",
            ColorMode::Rgb16 => "RGB;16",
            ColorMode::Rgba16 => "RGBA;16",
            ColorMode::Rgb32F => "RGB;32F",
            ColorMode::Rgba32F => "RGBA;32F",
            ColorMode::Other(name) => name,
        };
        f.write_str(code)
    }
}

impl ColorMode {
    /// Bytes one decoded pixel occupies in this layout.
    pub fn bytes_per_pixel(&self) -> u64 {
        match self {
            ColorMode::L => 1,
            ColorMode::La | ColorMode::L16 => 2,
            ColorMode::Rgb => 3,
            ColorMode::Rgba | ColorMode::La16 => 4,
            ColorMode::Rgb16 => 6,
            ColorMode::Rgba16 => 8,
            ColorMode::Rgb32F => 12,
            ColorMode::Rgba32F => 16,
            ColorMode::Other(_) => 4,
        }
    }
}

/// A successfully opened image: header parsed, payload not yet walked.
///
/// Accessors mirror what a report line prints: container format, size and
/// color mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    path: PathBuf,
    format: String,
    size: Dimensions,
    mode: ColorMode,
}

impl ImageHandle {
    pub fn new(
        path: impl Into<PathBuf>,
        format: impl Into<String>,
        size: Dimensions,
        mode: ColorMode,
    ) -> Self {
        Self {
            path: path.into(),
            format: format.into(),
            size,
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container format identifier, e.g. `PNG`.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn size(&self) -> Dimensions {
        self.size
    }

    pub fn mode(&self) -> &ColorMode {
        &self.mode
    }
}

/// Resource caps applied while decoding. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Upper bound on bytes the decoder may allocate for one image.
    pub max_alloc: Option<u64>,
}

impl DecodeLimits {
    /// Reject `size` if it breaks a dimension cap, or if a decoded buffer of
    /// that size in `mode` would not fit the allocation cap.
    pub fn check(&self, size: Dimensions, mode: &ColorMode) -> Result<(), DecodeError> {
        if let Some(max) = self.max_width
            && size.width > max
        {
            return Err(DecodeError::LimitExceeded(format!(
                "width {} is larger than {max}",
                size.width
            )));
        }
        if let Some(max) = self.max_height
            && size.height > max
        {
            return Err(DecodeError::LimitExceeded(format!(
                "height {} is larger than {max}",
                size.height
            )));
        }
        if let Some(max) = self.max_alloc {
            let needed = u64::from(size.width)
                .saturating_mul(u64::from(size.height))
                .saturating_mul(mode.bytes_per_pixel());
            if needed > max {
                return Err(DecodeError::LimitExceeded(format!(
                    "{needed} bytes needed, {max} allowed"
                )));
            }
        }
        Ok(())
    }
}

/// The capability the verifier is written against.
///
/// Any decoding library can sit behind this trait; the verifier only relies
/// on `open` failing for unreadable headers and `verify` failing for
/// payloads that cannot be fully decoded.
pub trait ImageDecoder {
    /// Recognise the container and parse its header.
    fn open(&self, path: &Path) -> Result<ImageHandle, DecodeError>;

    /// Walk the complete pixel payload of an opened image.
    fn verify(&self, handle: &ImageHandle) -> Result<(), DecodeError>;
}
