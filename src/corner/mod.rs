//! Strongest-corner detection ("good features to track").
//!
//! A response map is thresholded at `quality_level` times its maximum, then
//! local 3x3 maxima away from the one-pixel raster border become candidates.
//! Candidates are ranked by response, ties going to the later pixel in raster
//! order, then thinned by `min_distance` and truncated to `max_corners`.

mod response;

pub use response::{response_map, CornerMeasure, Harris, MinEigen, ResponseMap};

use crate::candidate::nms::suppress_within;
use crate::candidate::topk::{Peak, TopK};
use crate::geom::Point;
use crate::image::ImageView;
use crate::refine::quad2d::refine_peak_2d;
use crate::trace::trace_event;
use crate::util::{FidmarkError, FidmarkResult};

/// Which structure-tensor measure ranks the candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CornerResponseKind {
    /// Shi-Tomasi minimum eigenvalue.
    #[default]
    MinEigen,
    /// Harris measure with the given `k`.
    Harris { k: f32 },
}

/// Corner detector configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerParams {
    /// Maximum number of corners to return (at least 1).
    pub max_corners: usize,
    /// Minimum accepted response as a fraction of the strongest response.
    pub quality_level: f32,
    /// Minimum Euclidean distance between returned corners.
    pub min_distance: f32,
    /// Side of the window the structure tensor is summed over (odd).
    pub block_size: usize,
    pub response: CornerResponseKind,
    /// Fit a parabola through the response peak for a sub-pixel position.
    pub subpixel: bool,
}

impl Default for CornerParams {
    fn default() -> Self {
        Self {
            max_corners: 1,
            quality_level: 0.1,
            min_distance: 0.0,
            block_size: 3,
            response: CornerResponseKind::MinEigen,
            subpixel: false,
        }
    }
}

impl CornerParams {
    pub(crate) fn validate(&self) -> FidmarkResult<()> {
        if self.max_corners == 0 {
            return Err(FidmarkError::InvalidInput("max_corners must be at least 1"));
        }
        if !(self.quality_level > 0.0 && self.quality_level <= 1.0) {
            return Err(FidmarkError::InvalidInput("quality_level must be in (0, 1]"));
        }
        if !(self.min_distance >= 0.0) {
            return Err(FidmarkError::InvalidInput("min_distance must be >= 0"));
        }
        if self.block_size == 0 || self.block_size % 2 == 0 {
            return Err(FidmarkError::InvalidInput("corner block size must be odd"));
        }
        Ok(())
    }
}

/// A detected corner in the coordinates of the scanned raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    pub position: Point,
    pub response: f32,
}

fn local_maxima(map: &ResponseMap, threshold: f32) -> Vec<Peak> {
    let (width, height) = (map.width(), map.height());
    let kept = |x: usize, y: usize| -> f32 {
        match map.get(x, y) {
            Some(v) if v > threshold => v,
            _ => 0.0,
        }
    };

    let mut peaks = Vec::new();
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let v = kept(x, y);
            if v == 0.0 {
                continue;
            }
            let is_max = (y - 1..=y + 1)
                .all(|ny| (x - 1..=x + 1).all(|nx| kept(nx, ny) <= v));
            if is_max {
                peaks.push(Peak { x, y, score: v });
            }
        }
    }
    peaks
}

/// Finds the strongest corners of `src`, best first.
///
/// Returns an empty list when nothing qualifies, e.g. for a uniform raster.
pub fn good_features(src: ImageView<'_, u8>, params: &CornerParams) -> FidmarkResult<Vec<Corner>> {
    params.validate()?;
    let map = match params.response {
        CornerResponseKind::MinEigen => response_map(src, params.block_size, &MinEigen),
        CornerResponseKind::Harris { k } => response_map(src, params.block_size, &Harris { k }),
    };

    let max_response = map.data().iter().copied().fold(f32::MIN, f32::max);
    if !(max_response > 0.0) {
        return Ok(Vec::new());
    }
    let mut peaks = local_maxima(&map, max_response * params.quality_level);
    trace_event!("corner_candidates", count = peaks.len());

    let selected = if params.min_distance > 0.0 {
        suppress_within(&mut peaks, params.min_distance, params.max_corners)
    } else {
        let mut topk = TopK::new(params.max_corners);
        for peak in peaks {
            topk.push(peak);
        }
        topk.into_sorted_desc()
    };

    Ok(selected
        .into_iter()
        .map(|peak| {
            let position = match map.neighborhood(peak.x, peak.y) {
                Some(s) if params.subpixel => refine_peak_2d(peak.x, peak.y, s),
                _ => Point::new(peak.x as f64, peak.y as f64),
            };
            Corner {
                position,
                response: peak.score,
            }
        })
        .collect())
}

/// Returns the single strongest corner.
pub fn strongest_corner(src: ImageView<'_, u8>, params: &CornerParams) -> FidmarkResult<Corner> {
    let params = CornerParams {
        max_corners: 1,
        ..*params
    };
    good_features(src, &params)?
        .into_iter()
        .next()
        .ok_or(FidmarkError::NoCornerFound)
}

#[cfg(test)]
mod tests {
    use super::{good_features, strongest_corner, CornerParams, CornerResponseKind};
    use crate::image::ImageView;
    use crate::util::FidmarkError;

    fn quadrant(width: usize, height: usize, cx: usize, cy: usize) -> Vec<u8> {
        let mut data = vec![0u8; width * height];
        for y in cy..height {
            for x in cx..width {
                data[y * width + x] = 255;
            }
        }
        data
    }

    #[test]
    fn finds_quadrant_corner() {
        let data = quadrant(40, 30, 17, 12);
        let view = ImageView::from_slice(&data, 40, 30).unwrap();
        let corner = strongest_corner(view, &CornerParams::default()).unwrap();
        assert!((corner.position.x - 17.0).abs() <= 1.0);
        assert!((corner.position.y - 12.0).abs() <= 1.0);
    }

    #[test]
    fn harris_agrees_on_quadrant_corner() {
        let data = quadrant(40, 30, 17, 12);
        let view = ImageView::from_slice(&data, 40, 30).unwrap();
        let params = CornerParams {
            response: CornerResponseKind::Harris { k: 0.04 },
            subpixel: true,
            ..CornerParams::default()
        };
        let corner = strongest_corner(view, &params).unwrap();
        assert!((corner.position.x - 17.0).abs() <= 1.5);
        assert!((corner.position.y - 12.0).abs() <= 1.5);
    }

    #[test]
    fn symmetric_cross_ties_resolve_to_last_raster_position() {
        // Bright plus on a dark raster: its four inner corners score alike.
        let size = 41;
        let mut data = vec![0u8; size * size];
        for y in 0..size {
            for x in 0..size {
                if (14..=26).contains(&x) || (14..=26).contains(&y) {
                    data[y * size + x] = 255;
                }
            }
        }
        let view = ImageView::from_slice(&data, size, size).unwrap();
        let params = CornerParams {
            max_corners: 64,
            ..CornerParams::default()
        };
        let all = good_features(view, &params).unwrap();
        let best = all[0].response;
        let tied: Vec<_> = all.iter().filter(|c| c.response == best).collect();
        assert!(tied.len() >= 2, "expected tied inner corners");
        let last = tied
            .iter()
            .map(|c| (c.position.y as usize, c.position.x as usize))
            .max()
            .unwrap();

        let corner = strongest_corner(view, &CornerParams::default()).unwrap();
        assert_eq!(
            (corner.position.y as usize, corner.position.x as usize),
            last
        );
        assert!(corner.position.x > 20.0 && corner.position.y > 20.0);
    }

    #[test]
    fn uniform_raster_has_no_corner() {
        let data = [128u8; 100];
        let view = ImageView::from_slice(&data, 10, 10).unwrap();
        let err = strongest_corner(view, &CornerParams::default()).unwrap_err();
        assert_eq!(err, FidmarkError::NoCornerFound);
    }

    #[test]
    fn min_distance_separates_corners() {
        // Two bright squares far apart give at least two separated corners.
        let mut data = vec![0u8; 60 * 30];
        for y in 10..20 {
            for x in (5..15).chain(40..50) {
                data[y * 60 + x] = 255;
            }
        }
        let view = ImageView::from_slice(&data, 60, 30).unwrap();
        let params = CornerParams {
            max_corners: 8,
            min_distance: 5.0,
            ..CornerParams::default()
        };
        let corners = good_features(view, &params).unwrap();
        assert!(corners.len() >= 2);
        for (i, a) in corners.iter().enumerate() {
            for b in &corners[i + 1..] {
                assert!(a.position.distance(b.position) >= 5.0);
            }
        }
    }
}
