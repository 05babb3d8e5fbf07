//! # imgverify
//!
//! Sanity-checks image assets before a build or deploy: does each file
//! exist, and does it decode completely? For every path it reports the
//! container format, pixel size and color mode, or the decoder's diagnostic.
//!
//! ```text
//! File not found: public/company_logo_transparent.png
//! Image public/company_logo.png is valid. Format: PNG, Size: (512, 128), Mode: RGBA
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`verify`] | The total `verify` operation and the [`VerificationResult`](verify::VerificationResult) it returns |
//! | [`decoder`] | The [`ImageDecoder`](decoder::ImageDecoder) capability and its pure-Rust implementation |
//! | [`output`] | Report line formatting |
//! | [`config`] | Decoder limits from an optional TOML file |
//!
//! # Design Decisions
//!
//! ## Two Validity Signals
//!
//! A header that parses says little about the rest of the file: a PNG cut
//! off halfway through its IDAT stream still reports the right width and
//! height. Verification therefore runs two passes, a header parse
//! ([`ImageDecoder::open`](decoder::ImageDecoder::open)) and a full pixel
//! decode ([`ImageDecoder::verify`](decoder::ImageDecoder::verify)), and an
//! image is valid only when both succeed.
//!
//! ## Verification Never Fails
//!
//! [`Verifier::verify`](verify::Verifier::verify) returns a result for every
//! input: missing files, directories, unreadable files, garbage bytes and
//! even decoder panics all become a `NotFound` or `Invalid` result. The
//! process exit status does not depend on what was found.
//!
//! ## Decoder Behind a Trait
//!
//! The verifier only sees the [`ImageDecoder`](decoder::ImageDecoder) trait.
//! The shipped [`RustDecoder`](decoder::RustDecoder) uses the `image` crate
//! plus `avif-parse`/`rav1d` for AVIF, all pure Rust, so the binary has no
//! system library dependencies. Tests swap in a recording mock.

pub mod config;
pub mod decoder;
pub mod output;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_helpers;
