//! Local adaptive thresholding.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::saturate_u8;
use crate::util::{FidmarkError, FidmarkResult};

/// Sums a `2 * radius + 1` window around every sample, replicating the edge
/// samples for positions outside the line.
fn replicate_window_sums(line: &[u64], radius: usize, prefix: &mut Vec<u64>, out: &mut [u64]) {
    let n = line.len();
    prefix.clear();
    prefix.push(0);
    let mut acc = 0u64;
    for &v in line {
        acc += v;
        prefix.push(acc);
    }

    let first = line[0];
    let last = line[n - 1];
    for (x, sum) in out.iter_mut().enumerate().take(n) {
        let lo = x as isize - radius as isize;
        let hi = x + radius;
        let start = lo.max(0) as usize;
        let end = hi.min(n - 1);
        let left_extra = if lo < 0 { (-lo) as u64 } else { 0 };
        let right_extra = hi.saturating_sub(n - 1) as u64;
        *sum = prefix[end + 1] - prefix[start] + left_extra * first + right_extra * last;
    }
}

/// Binarizes against the mean of the `block_size x block_size` neighborhood.
///
/// A pixel becomes `max_value` when it is strictly brighter than its rounded
/// local mean, and `0` otherwise. Borders replicate the edge samples, so a
/// block larger than the raster is valid. `block_size` must be odd and > 1.
pub fn adaptive_mean_threshold(
    src: ImageView<'_, u8>,
    block_size: usize,
    max_value: u8,
) -> FidmarkResult<OwnedImage> {
    if block_size < 3 || block_size % 2 == 0 {
        return Err(FidmarkError::InvalidInput(
            "block size must be odd and greater than 1",
        ));
    }
    let width = src.width();
    let height = src.height();
    let radius = block_size / 2;
    let area = (block_size * block_size) as f64;

    let mut prefix = Vec::with_capacity(width.max(height) + 1);
    let mut line = vec![0u64; width];
    let mut row_sums = vec![0u64; width * height];
    for (y, row) in src.rows().enumerate() {
        for (dst, &v) in line.iter_mut().zip(row) {
            *dst = u64::from(v);
        }
        replicate_window_sums(&line, radius, &mut prefix, &mut row_sums[y * width..(y + 1) * width]);
    }

    let mut out = OwnedImage::filled(width, height, 0)?;
    let mut column = vec![0u64; height];
    let mut box_sums = vec![0u64; height];
    for x in 0..width {
        for (y, value) in column.iter_mut().enumerate() {
            *value = row_sums[y * width + x];
        }
        replicate_window_sums(&column, radius, &mut prefix, &mut box_sums);
        for (y, &sum) in box_sums.iter().enumerate() {
            let mean = saturate_u8(sum as f64 / area);
            let value = src.get(x, y).copied().unwrap_or(0);
            if value > mean {
                out.data_mut()[y * width + x] = max_value;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::adaptive_mean_threshold;
    use crate::image::ImageView;

    #[test]
    fn bright_pixels_above_local_mean_turn_on() {
        // Left half dark, right half bright; only bright pixels near the step
        // exceed their neighborhood mean.
        let mut data = vec![10u8; 8 * 4];
        for y in 0..4 {
            for x in 4..8 {
                data[y * 8 + x] = 200;
            }
        }
        let view = ImageView::from_slice(&data, 8, 4).unwrap();
        let out = adaptive_mean_threshold(view, 3, 180).unwrap();
        for y in 0..4 {
            assert_eq!(out.get(3, y), Some(0));
            assert_eq!(out.get(4, y), Some(180));
            assert_eq!(out.get(6, y), Some(0));
        }
    }

    #[test]
    fn oversized_block_uses_replicated_borders() {
        let data = [0u8, 0, 0, 255];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let out = adaptive_mean_threshold(view, 999, 255).unwrap();
        assert_eq!(out.data(), &[0, 0, 0, 255]);
    }

    #[test]
    fn even_block_is_rejected() {
        let data = [0u8; 4];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        assert!(adaptive_mean_threshold(view, 4, 255).is_err());
    }
}
