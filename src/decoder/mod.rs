//! Image decoding: the capability the verifier depends on, and the pure Rust
//! implementation that ships in the binary.
//!
//! | Concern | Where |
//! |---|---|
//! | Trait, handle, errors, limits | [`backend`] |
//! | `image`-crate decoder | [`rust_decoder`] |
//! | JPEG end-of-stream check | `jpeg` (internal) |
//! | AVIF via `avif-parse` + `rav1d` | `avif` (internal) |

mod avif;
mod jpeg;
pub mod backend;
pub mod rust_decoder;

pub use backend::{ColorMode, DecodeError, DecodeLimits, Dimensions, ImageDecoder, ImageHandle};
pub use rust_decoder::{RustDecoder, format_name};
