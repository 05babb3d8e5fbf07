//! AVIF identification and full decode.
//!
//! The `image` crate's `"avif"` feature only enables the **encoder** (rav1e);
//! decoding needs `"avif-native"`, which links the dav1d C library. AVIF files
//! are therefore handled here: `avif-parse` reads the HEIF container and the
//! AV1 sequence header, `rav1d` (pure Rust port of dav1d) decodes the frames.

use super::backend::{ColorMode, DecodeError, DecodeLimits, Dimensions, ImageHandle};
use std::path::Path;

pub(crate) const FORMAT_NAME: &str = "AVIF";

fn read_container(path: &Path) -> Result<avif_parse::AvifData, DecodeError> {
    let file_data = std::fs::read(path)?;
    avif_parse::read_avif(&mut std::io::Cursor::new(&file_data))
        .map_err(|e| DecodeError::Corrupt(format!("failed to parse AVIF container: {e:?}")))
}

/// Parse the container and primary item header; no AV1 decode.
pub(crate) fn open(path: &Path, limits: &DecodeLimits) -> Result<ImageHandle, DecodeError> {
    let avif = read_container(path)?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| DecodeError::Corrupt(format!("failed to read AVIF metadata: {e:?}")))?;
    let size = Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    };
    let mode = match (meta.monochrome, avif.alpha_item.is_some()) {
        (true, false) => ColorMode::L,
        (true, true) => ColorMode::La,
        (false, false) => ColorMode::Rgb,
        (false, true) => ColorMode::Rgba,
    };
    limits.check(size, &mode)?;
    Ok(ImageHandle::new(path, FORMAT_NAME, size, mode))
}

/// Decode the primary item, and the alpha item when present, checking each
/// frame against the size declared by the container.
pub(crate) fn verify(handle: &ImageHandle, limits: &DecodeLimits) -> Result<(), DecodeError> {
    limits.check(handle.size(), handle.mode())?;
    let avif = read_container(handle.path())?;

    let color = decode_frame(&avif.primary_item)?;
    check_frame_size("color", color, handle.size())?;

    if let Some(alpha_item) = &avif.alpha_item {
        let alpha = decode_frame(alpha_item)?;
        check_frame_size("alpha", alpha, handle.size())?;
    }
    Ok(())
}

fn check_frame_size(
    plane: &str,
    decoded: Dimensions,
    declared: Dimensions,
) -> Result<(), DecodeError> {
    if decoded == declared {
        Ok(())
    } else {
        Err(DecodeError::Corrupt(format!(
            "AVIF {plane} frame decodes to {}x{} but the header declares {}x{}",
            decoded.width, decoded.height, declared.width, declared.height
        )))
    }
}

/// Run one AV1 payload through rav1d and return the decoded frame size.
///
/// Only `p.w`/`p.h` are read from the picture: a successful `get_picture`
/// already means every tile decoded, so the planes themselves are never
/// converted, only released.
fn decode_frame(av1_bytes: &[u8]) -> Result<Dimensions, DecodeError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use std::ptr::NonNull;

    if av1_bytes.is_empty() {
        return Err(DecodeError::Corrupt("AVIF item has no AV1 payload".into()));
    }

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    let settings_ptr = NonNull::new(settings.as_mut_ptr())
        .ok_or_else(|| DecodeError::Corrupt("rav1d settings allocation failed".into()))?;
    unsafe { rav1d::src::lib::dav1d_default_settings(settings_ptr) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(DecodeError::Corrupt(format!("rav1d open failed ({})", rc.0)));
    }

    let mut data = Dav1dData::default();
    let buf_ptr =
        unsafe { rav1d::src::lib::dav1d_data_create(NonNull::new(&mut data), av1_bytes.len()) };
    if buf_ptr.is_null() {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(DecodeError::Corrupt("rav1d data_create failed".into()));
    }
    unsafe { std::ptr::copy_nonoverlapping(av1_bytes.as_ptr(), buf_ptr, av1_bytes.len()) };

    let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut data)) };
    if rc.0 != 0 {
        unsafe {
            rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data));
            rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(DecodeError::Corrupt(format!(
            "AV1 payload rejected by decoder ({})",
            rc.0
        )));
    }

    let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
    let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
    if rc.0 != 0 {
        unsafe {
            rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data));
            rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(DecodeError::Corrupt(format!(
            "AV1 frame could not be decoded ({})",
            rc.0
        )));
    }

    let decoded = Dimensions {
        width: pic.p.w as u32,
        height: pic.p.h as u32,
    };

    unsafe {
        rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
        rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data));
        rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
    }

    Ok(decoded)
}
