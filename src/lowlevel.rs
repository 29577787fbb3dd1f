//! Low-level building blocks for custom pipelines.
//!
//! These expose the raster primitives and corner-candidate helpers that the
//! high-level `FiducialSet` and `RegionCollection` APIs are built from. Most
//! users should prefer those types.

pub use crate::candidate::nms::suppress_within;
pub use crate::candidate::topk::{Peak, TopK};
pub use crate::corner::{
    good_features, response_map, strongest_corner, CornerMeasure, Harris, MinEigen, ResponseMap,
};
pub use crate::raster::{
    adaptive_mean_threshold, dilate, erode, fill_polygon, normalize_min_max, open,
    outer_contours, Connectivity,
};
pub use crate::refine::quad2d::refine_peak_2d;
