//! The verification procedure.
//!
//! [`Verifier::verify`] is a total function: every failure mode, from a
//! missing file through a truncated payload to a decoder panic, comes back as
//! a [`VerificationResult`] variant. Nothing is propagated to the caller.
//!
//! ```text
//! path ──exists?──no──▶ NotFound
//!          │
//!         yes
//!          ▼
//!    decoder.open ──err──▶ Invalid(error)
//!          │
//!          ▼
//!   decoder.verify ──err──▶ Invalid(error)
//!          │
//!          ▼
//!   Valid(format, dimensions, color mode)
//! ```
//!
//! The existence check is advisory. A file that disappears between the check
//! and the decode simply fails to open and is reported as invalid.
//!
//! Panics raised inside a decoder are caught and reported as invalid. While a
//! decode runs, the process panic hook is silenced for that thread so the
//! report on stdout is the only trace; the panic text is logged at debug.

use crate::decoder::{ColorMode, DecodeError, Dimensions, ImageDecoder, ImageHandle};
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info};

/// Used when a decoder reports an error with no text.
const UNKNOWN_ERROR: &str = "unknown decode error";

thread_local! {
    /// Set while this thread is inside a decoder call.
    static DECODING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wrap the current panic hook so panics on a decoding thread become a debug
/// event. Panics anywhere else still reach the previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if DECODING.with(Cell::get) {
                debug!(%info, "decoder panicked");
            } else {
                previous(info);
            }
        }));
    });
}

/// Outcome of verifying one path.
///
/// Format, dimensions and color mode exist only on [`Valid`](Self::Valid);
/// the error text exists only on [`Invalid`](Self::Invalid).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    NotFound {
        path: PathBuf,
    },
    Valid {
        path: PathBuf,
        format: String,
        dimensions: Dimensions,
        color_mode: ColorMode,
    },
    Invalid {
        path: PathBuf,
        error: String,
    },
}

/// Discriminant of a [`VerificationResult`], for callers that only need
/// the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    Valid,
    Invalid,
}

impl VerificationResult {
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Valid { path, .. } | Self::Invalid { path, .. } => {
                path
            }
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::NotFound { .. } => Outcome::NotFound,
            Self::Valid { .. } => Outcome::Valid,
            Self::Invalid { .. } => Outcome::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.outcome() == Outcome::Valid
    }

    fn valid(path: &Path, handle: &ImageHandle) -> Self {
        Self::Valid {
            path: path.to_path_buf(),
            format: handle.format().to_string(),
            dimensions: handle.size(),
            color_mode: handle.mode().clone(),
        }
    }

    fn invalid(path: &Path, error: String) -> Self {
        let error = if error.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            error
        };
        Self::Invalid {
            path: path.to_path_buf(),
            error,
        }
    }
}

/// Verifies image files against an [`ImageDecoder`].
///
/// Holds no state between calls; verifying the same unchanged file twice
/// gives the same result.
pub struct Verifier<D> {
    decoder: D,
}

impl<D: ImageDecoder> Verifier<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Check that `path` exists and decodes completely.
    pub fn verify(&self, path: impl AsRef<Path>) -> VerificationResult {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "file not found");
            return VerificationResult::NotFound {
                path: path.to_path_buf(),
            };
        }

        install_quiet_hook();
        DECODING.with(|d| d.set(true));
        let decoded = panic::catch_unwind(AssertUnwindSafe(|| self.decode(path)));
        DECODING.with(|d| d.set(false));

        let result = match decoded {
            Ok(Ok(handle)) => VerificationResult::valid(path, &handle),
            Ok(Err(e)) => VerificationResult::invalid(path, e.to_string()),
            Err(payload) => VerificationResult::invalid(path, panic_message(payload.as_ref())),
        };

        match &result {
            VerificationResult::Valid {
                format,
                dimensions,
                color_mode,
                ..
            } => info!(
                path = %path.display(),
                %format,
                %dimensions,
                mode = %color_mode,
                "image is valid"
            ),
            VerificationResult::Invalid { error, .. } => {
                info!(path = %path.display(), %error, "image is invalid")
            }
            VerificationResult::NotFound { .. } => {}
        }
        result
    }

    /// Verify each path in order. Results line up with `paths`.
    pub fn verify_all<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<VerificationResult> {
        paths.iter().map(|p| self.verify(p)).collect()
    }

    fn decode(&self, path: &Path) -> Result<ImageHandle, DecodeError> {
        let handle = self.decoder.open(path)?;
        debug!(
            path = %path.display(),
            format = handle.format(),
            size = %handle.size(),
            "header parsed, walking pixel data"
        );
        self.decoder.verify(&handle)?;
        Ok(handle)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("decoder panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("decoder panicked: {s}")
    } else {
        "decoder panicked".to_string()
    }
}
