//! JPEG completeness check.
//!
//! The baseline JPEG decoder behind `image` pads a short entropy stream with
//! zeros and returns a full-size image, so a file cut mid-scan decodes
//! without error. [`check_complete`] walks the marker structure and requires
//! it to end in an EOI marker.

use super::backend::DecodeError;

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const TEM: u8 = 0x01;
const RST0: u8 = 0xD0;
const RST7: u8 = 0xD7;

fn truncated(context: &str) -> DecodeError {
    DecodeError::Corrupt(format!("JPEG data ends before the EOI marker ({context})"))
}

/// Walk the marker segments of `bytes`, failing unless every segment is
/// complete and an EOI marker is reached.
pub(crate) fn check_complete(bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.len() < 2 || bytes[0] != 0xFF || bytes[1] != SOI {
        return Err(DecodeError::Corrupt("JPEG data does not start with SOI".into()));
    }

    let mut pos = 2;
    loop {
        // markers may be preceded by any number of 0xFF fill bytes
        if bytes.get(pos) != Some(&0xFF) {
            return match bytes.get(pos) {
                None => Err(truncated("between segments")),
                Some(b) => Err(DecodeError::Corrupt(format!(
                    "expected a JPEG marker at offset {pos}, found 0x{b:02X}"
                ))),
            };
        }
        while bytes.get(pos) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *bytes.get(pos).ok_or_else(|| truncated("inside a marker"))?;
        pos += 1;

        match marker {
            EOI => return Ok(()),
            TEM | RST0..=RST7 => continue,
            _ => {}
        }

        let len_bytes = bytes
            .get(pos..pos + 2)
            .ok_or_else(|| truncated("inside a segment length"))?;
        let len = usize::from(u16::from_be_bytes([len_bytes[0], len_bytes[1]]));
        if len < 2 {
            return Err(DecodeError::Corrupt(format!(
                "JPEG segment 0x{marker:02X} has invalid length {len}"
            )));
        }
        if pos + len > bytes.len() {
            return Err(truncated("inside a segment"));
        }
        pos += len;

        if marker == SOS {
            pos = skip_entropy_data(bytes, pos)?;
        }
    }
}

/// Skip entropy-coded data after a scan header, returning the offset of the
/// next real marker.
fn skip_entropy_data(bytes: &[u8], mut pos: usize) -> Result<usize, DecodeError> {
    while pos < bytes.len() {
        if bytes[pos] != 0xFF {
            pos += 1;
            continue;
        }
        match bytes.get(pos + 1) {
            None => break,
            // stuffed zero, restart marker or fill byte: still inside the scan
            Some(0x00) | Some(RST0..=RST7) => pos += 2,
            Some(0xFF) => pos += 1,
            Some(_) => return Ok(pos),
        }
    }
    Err(truncated("inside entropy-coded data"))
}
