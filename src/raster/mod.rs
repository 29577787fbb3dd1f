//! Raster operations on 8-bit single-channel images.

pub mod contour;
pub mod fill;
pub mod morph;
pub mod normalize;
pub mod threshold;

pub use contour::{outer_contours, Connectivity};
pub use fill::fill_polygon;
pub use morph::{dilate, erode, open};
pub use normalize::normalize_min_max;
pub use threshold::adaptive_mean_threshold;
