//! Canonical sRGB ICC profile
//!
//! The profile is generated with lcms2 rather than copied from camera
//! metadata. lcms2 stamps the serialization time into the header, so the
//! creation date is pinned and the profile ID cleared; every process then
//! embeds the exact same bytes.

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use super::error::CodecError;

/// Header creation date (`dateTimeNumber`, big-endian u16 fields)
const HEADER_DATE: Range<usize> = 24..36;

/// 2000-01-01 00:00:00
pub const PROFILE_DATE: [u8; 12] = [0x07, 0xD0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0];

/// MD5 profile ID; all zero means "not computed"
const HEADER_PROFILE_ID: Range<usize> = 84..100;

static SRGB_PROFILE: OnceLock<Result<Arc<Vec<u8>>, CodecError>> = OnceLock::new();

/// Return the serialized standard sRGB (IEC 61966-2.1) profile.
pub fn srgb_icc_profile() -> Result<Arc<Vec<u8>>, CodecError> {
    SRGB_PROFILE
        .get_or_init(|| {
            let icc = lcms2::Profile::new_srgb()
                .icc()
                .map_err(|e| CodecError::profile_failed(e.to_string()))?;
            normalize_header(icc).map(Arc::new)
        })
        .clone()
}

/// Overwrite the time-dependent header fields with fixed values.
fn normalize_header(mut icc: Vec<u8>) -> Result<Vec<u8>, CodecError> {
    if icc.len() < HEADER_PROFILE_ID.end {
        return Err(CodecError::profile_failed(format!(
            "profile of {} bytes is shorter than an ICC header",
            icc.len()
        )));
    }
    icc[HEADER_DATE].copy_from_slice(&PROFILE_DATE);
    icc[HEADER_PROFILE_ID].fill(0);
    Ok(icc)
}
