//! Quality search against a byte budget.
//!
//! Binary search over the encoder quality, assuming encoded size grows with
//! quality. Codecs that break that assumption still get a bounded number of
//! probes and a best-effort answer.

use crate::Result;
use tracing::debug;

pub const MIN_QUALITY: u8 = 5;
pub const MAX_QUALITY: u8 = 100;
pub const MAX_PROBES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedEncoding {
    pub bytes: Vec<u8>,
    pub quality: u8,
    /// Search probes performed, excluding the final encode.
    pub probes: u32,
}

/// Finds the highest quality whose encoding fits in `target_bytes`.
///
/// The first probe is `requested`. The budget is not guaranteed to be met;
/// only `encode` errors are returned.
pub fn optimize_quality<F>(
    requested: u8,
    target_bytes: u64,
    mut encode: F,
) -> Result<OptimizedEncoding>
where
    F: FnMut(u8) -> Result<Vec<u8>>,
{
    let mut min_quality = i32::from(MIN_QUALITY);
    let mut max_quality = i32::from(MAX_QUALITY);
    let mut quality = i32::from(requested.clamp(1, MAX_QUALITY));
    let mut accepted: Option<(i32, Vec<u8>)> = None;
    let mut probes = 0;

    while probes < MAX_PROBES {
        let bytes = encode(quality as u8)?;
        probes += 1;
        let size = bytes.len() as u64;

        if size <= target_bytes {
            debug!("Quality {} fits ({} <= {} bytes)", quality, size, target_bytes);
            min_quality = quality + 1;
            accepted = Some((quality, bytes));
        } else {
            debug!("Quality {} too large ({} > {} bytes)", quality, size, target_bytes);
            max_quality = quality - 1;
        }

        if min_quality >= max_quality {
            break;
        }
        quality = (min_quality + max_quality) / 2;
    }

    let final_quality = (min_quality - 1).max(i32::from(MIN_QUALITY));
    let bytes = match accepted {
        Some((q, bytes)) if q == final_quality => bytes,
        _ => encode(final_quality as u8)?,
    };

    Ok(OptimizedEncoding {
        bytes,
        quality: final_quality as u8,
        probes,
    })
}
