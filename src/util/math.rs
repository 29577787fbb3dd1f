//! Index and rounding helpers shared by the raster kernels.

/// Maps a possibly out-of-range index into `[0, len)` by mirroring without
/// repeating the edge sample (`gfedcb|abcdefgh|gfedcba`).
pub(crate) fn reflect101(i: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = (2 * len - 2) as isize;
    let r = i.rem_euclid(period) as usize;
    if r < len {
        r
    } else {
        2 * len - 2 - r
    }
}

/// Rounds to the nearest integer (ties to even) and saturates into `u8`.
pub(crate) fn saturate_u8(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round_ties_even().clamp(0.0, 255.0) as u8
}
