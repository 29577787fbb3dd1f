//! Coordinate types at the raster/vector boundary.
//!
//! Two spaces meet in this crate. Vector geometry uses [`Point`] with
//! `x` = column and `y` = row as floats. Raster crops use [`PixelIndex`] and
//! [`PixelRect`], which list rows before columns as integer indices. Explicit
//! conversions live here so the two orders never mix silently.

mod polygon;

pub use polygon::Polygon;

use crate::util::{FidmarkError, FidmarkResult};

/// A 2D point in image plot coordinates (`x` = column, `y` = row).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translates a point local to a crop into the parent raster.
    pub fn offset_by(self, origin: PixelIndex) -> Self {
        Self {
            x: origin.col as f64 + self.x,
            y: origin.row as f64 + self.y,
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Integer raster index in `(row, col)` order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelIndex {
    pub row: usize,
    pub col: usize,
}

impl PixelIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The lattice point at the top-left corner of this pixel.
    pub fn to_point(self) -> Point {
        Point::new(self.col as f64, self.row as f64)
    }
}

/// Half-open pixel rectangle: rows `[top, bottom)`, columns `[left, right)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl PixelRect {
    pub const fn new(top: usize, bottom: usize, left: usize, right: usize) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    /// Index of the top-left pixel.
    pub fn origin(&self) -> PixelIndex {
        PixelIndex::new(self.top, self.left)
    }

    pub fn contains(&self, index: PixelIndex) -> bool {
        (self.top..self.bottom).contains(&index.row) && (self.left..self.right).contains(&index.col)
    }

    /// The rectangle outline on the pixel-corner lattice.
    ///
    /// Filling the returned polygon covers exactly the pixels of `self`.
    pub fn to_polygon(&self) -> FidmarkResult<Polygon> {
        let (top, bottom) = (self.top as f64, self.bottom as f64);
        let (left, right) = (self.left as f64, self.right as f64);
        Polygon::new(vec![
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ])
    }
}

/// Min/max bounds of a vertex set: `top`/`bottom` are y, `left`/`right` are x.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Converts the bounds to a crop rectangle, rounding to the nearest index.
    ///
    /// The result is not clamped to any raster; crop it with
    /// [`ImageView::crop`](crate::ImageView::crop), which rejects rectangles
    /// that do not fit.
    pub fn to_pixel_rect(&self) -> FidmarkResult<PixelRect> {
        let bounds = [self.top, self.bottom, self.left, self.right];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(FidmarkError::InvalidInput("extent is not finite"));
        }
        if bounds.iter().any(|&v| v < 0.0) {
            return Err(FidmarkError::InvalidInput("extent has negative coordinates"));
        }
        Ok(PixelRect::new(
            self.top.round() as usize,
            self.bottom.round() as usize,
            self.left.round() as usize,
            self.right.round() as usize,
        ))
    }
}
