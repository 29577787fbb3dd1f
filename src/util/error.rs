//! Error types for fidmark.

use thiserror::Error;

/// Result alias for fidmark operations.
pub type FidmarkResult<T> = std::result::Result<T, FidmarkError>;

/// Errors that can occur when running fidmark algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FidmarkError {
    /// A polygon cannot support the requested operation.
    #[error("degenerate polygon: {reason}")]
    DegeneratePolygon { reason: &'static str },
    /// The corner detector produced no candidate.
    #[error("no corner candidate found")]
    NoCornerFound,
    /// Two region collections refer to different source images.
    #[error("region collections refer to different source images")]
    IncompatibleSource,
    /// Coordinates were requested before a corner was located.
    #[error("corner coordinates are not available before detection")]
    CoordinateNotAvailable,
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is too short for the declared layout.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region of interest does not fit inside the image.
    #[error(
        "crop ({x}, {y}, {width}x{height}) is outside image {img_width}x{img_height}"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image decoding or encoding failed.
    #[cfg(feature = "image-io")]
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
}
