//! Grayscale raster views and owned buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! Pixel access is always `(x, y) = (column, row)`. Crops are expressed with
//! [`PixelRect`], which lists rows before columns.

use crate::geom::PixelRect;
use crate::util::{FidmarkError, FidmarkResult};

#[cfg(feature = "image-io")]
pub mod io;
mod owned;

pub use owned::OwnedImage;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> FidmarkResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> FidmarkResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(FidmarkError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns true when both views read the same pixels of the same buffer.
    ///
    /// Identity is the backing address plus the full layout; two equal-valued
    /// images in different buffers are different sources.
    pub fn same_source(&self, other: &ImageView<'_, T>) -> bool {
        std::ptr::eq(self.data.as_ptr(), other.data.as_ptr())
            && self.width == other.width
            && self.height == other.height
            && self.stride == other.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Iterates over all rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Returns a zero-copy view of a half-open row/column rectangle.
    ///
    /// The view shares the backing buffer and keeps the parent stride. Empty
    /// rectangles and rectangles reaching past the raster are rejected.
    pub fn crop(&self, rect: PixelRect) -> FidmarkResult<ImageView<'a, T>> {
        let width = rect.width();
        let height = rect.height();
        if width == 0 || height == 0 {
            return Err(FidmarkError::InvalidDimensions { width, height });
        }
        if rect.right > self.width || rect.bottom > self.height {
            return Err(FidmarkError::RoiOutOfBounds {
                x: rect.left,
                y: rect.top,
                width,
                height,
                img_width: self.width,
                img_height: self.height,
            });
        }

        let start = rect
            .top
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(rect.left))
            .ok_or(FidmarkError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self.data.get(start..).ok_or(FidmarkError::BufferTooSmall {
            needed: start.saturating_add(1),
            got: self.data.len(),
        })?;
        ImageView::new(data, width, height, self.stride)
    }
}

impl ImageView<'_, u8> {
    /// Returns the largest sample in the view.
    pub fn max_value(&self) -> u8 {
        self.rows()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Returns the smallest and largest sample in the view.
    pub fn min_max(&self) -> (u8, u8) {
        self.rows()
            .flat_map(|row| row.iter().copied())
            .fold((u8::MAX, u8::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }

    /// Counts samples that differ from `value`.
    pub fn count_not_equal(&self, value: u8) -> usize {
        self.rows()
            .map(|row| row.iter().filter(|&&v| v != value).count())
            .sum()
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> FidmarkResult<usize> {
    if width == 0 || height == 0 {
        return Err(FidmarkError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(FidmarkError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(FidmarkError::InvalidDimensions { width, height })?;
    Ok(needed)
}
