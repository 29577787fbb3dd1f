use crate::geom::Polygon;
use crate::util::FidmarkResult;

/// Open-interval bounds on polygon attributes.
///
/// A polygon passes when every attribute lies strictly between its bounds.
/// Unset bounds are infinite, so the default filter keeps everything.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionFilter {
    pub min_area: f64,
    pub max_area: f64,
    pub min_edge_distance: f64,
    pub max_edge_distance: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for RegionFilter {
    fn default() -> Self {
        Self {
            min_area: f64::NEG_INFINITY,
            max_area: f64::INFINITY,
            min_edge_distance: f64::NEG_INFINITY,
            max_edge_distance: f64::INFINITY,
            min_ratio: f64::NEG_INFINITY,
            max_ratio: f64::INFINITY,
        }
    }
}

impl RegionFilter {
    pub fn with_area(mut self, min: f64, max: f64) -> Self {
        self.min_area = min;
        self.max_area = max;
        self
    }

    pub fn with_edge_distance(mut self, min: f64, max: f64) -> Self {
        self.min_edge_distance = min;
        self.max_edge_distance = max;
        self
    }

    pub fn with_ratio(mut self, min: f64, max: f64) -> Self {
        self.min_ratio = min;
        self.max_ratio = max;
        self
    }

    /// True when a ratio bound is finite and the ratio must be computed.
    pub fn ratio_active(&self) -> bool {
        self.min_ratio.is_finite() || self.max_ratio.is_finite()
    }

    /// Evaluates the filter on one polygon inside a `frame_width x frame_height` frame.
    ///
    /// Fails only when the ratio predicate is active and the polygon has a
    /// zero-width bounding box.
    pub fn accepts(
        &self,
        polygon: &Polygon,
        frame_width: f64,
        frame_height: f64,
    ) -> FidmarkResult<bool> {
        let area = polygon.area();
        if !(self.min_area < area && area < self.max_area) {
            return Ok(false);
        }
        let distance = polygon.edge_distance(frame_width, frame_height);
        if !(self.min_edge_distance < distance && distance < self.max_edge_distance) {
            return Ok(false);
        }
        if self.ratio_active() {
            let ratio = polygon.height_width_ratio()?;
            if !(self.min_ratio < ratio && ratio < self.max_ratio) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
