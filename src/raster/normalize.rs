//! Intensity range stretching.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::saturate_u8;
use crate::util::FidmarkResult;

/// Linearly maps `[min, max]` of the input onto `[0, 255]`.
///
/// A uniform input has no range to stretch and maps to all zeros.
pub fn normalize_min_max(src: ImageView<'_, u8>) -> FidmarkResult<OwnedImage> {
    let (lo, hi) = src.min_max();
    let range = f64::from(hi - lo);

    let mut out = OwnedImage::filled(src.width(), src.height(), 0)?;
    for (y, row) in src.rows().enumerate() {
        if let Some(dst) = out.row_mut(y) {
            for (d, &v) in dst.iter_mut().zip(row) {
                *d = if range > 0.0 {
                    // Integer numerator keeps exact halves exact before rounding.
                    saturate_u8(f64::from(v - lo) * 255.0 / range)
                } else {
                    0
                };
            }
        }
    }
    Ok(out)
}
