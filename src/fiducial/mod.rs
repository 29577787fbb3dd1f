//! Fiducial marks: per-crop filtering, corner localization and mapping back
//! into the scanned photo.

mod set;

pub use set::{crop_rects, CropSize, FiducialSet, LocateConfig, Side};

use crate::corner::{strongest_corner, CornerParams};
use crate::geom::{PixelIndex, Point};
use crate::image::{ImageView, OwnedImage};
use crate::raster::{adaptive_mean_threshold, normalize_min_max, open};
use crate::trace::{trace_event, trace_span};
use crate::util::{FidmarkError, FidmarkResult};

/// Crop filtering parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterParams {
    /// Side of the square opening element.
    pub kernel_size: usize,
    /// Erosion/dilation passes of the opening.
    pub iterations: usize,
    /// Binarize against the local mean after the opening.
    pub use_threshold: bool,
    /// Window of the local mean (odd, > 1).
    pub block_size: usize,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            iterations: 4,
            use_threshold: false,
            block_size: 999,
        }
    }
}

/// Progress of a mark through the filter/detect pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkState {
    /// Only the crop is available.
    Cropped,
    /// The filtered raster is ready; no corner yet.
    Filtered { filtered: OwnedImage },
    /// A corner was found at `corner`, in crop-local coordinates.
    Located { filtered: OwnedImage, corner: Point },
    /// Detection ran and failed.
    Failed {
        filtered: OwnedImage,
        error: FidmarkError,
    },
}

/// One fiducial crop and its position inside the parent photo.
#[derive(Clone, Debug, PartialEq)]
pub struct FiducialMark {
    crop: OwnedImage,
    offset: PixelIndex,
    state: MarkState,
}

impl FiducialMark {
    /// Wraps a crop whose top-left pixel sits at `offset` in the parent photo.
    pub fn new(crop: OwnedImage, offset: PixelIndex) -> Self {
        Self {
            crop,
            offset,
            state: MarkState::Cropped,
        }
    }

    pub fn crop(&self) -> ImageView<'_, u8> {
        self.crop.view()
    }

    pub fn offset(&self) -> PixelIndex {
        self.offset
    }

    pub fn state(&self) -> &MarkState {
        &self.state
    }

    /// The filtered raster, once [`FiducialMark::filter`] has run.
    pub fn filtered(&self) -> Option<ImageView<'_, u8>> {
        match &self.state {
            MarkState::Cropped => None,
            MarkState::Filtered { filtered }
            | MarkState::Located { filtered, .. }
            | MarkState::Failed { filtered, .. } => Some(filtered.view()),
        }
    }

    /// Detected corner in crop coordinates (`x` = column, `y` = row).
    pub fn local_corner(&self) -> Option<Point> {
        match &self.state {
            MarkState::Located { corner, .. } => Some(*corner),
            _ => None,
        }
    }

    /// The error of the last failed detection, if any.
    pub fn error(&self) -> Option<&FidmarkError> {
        match &self.state {
            MarkState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Prepares the crop for corner detection.
    ///
    /// Stretches the intensity range to `[0, 255]`, applies a morphological
    /// opening and optionally an adaptive mean threshold whose "on" value is
    /// the brightest opened sample. The crop itself is left untouched. Any
    /// previously located corner is discarded.
    pub fn filter(&mut self, params: &FilterParams) -> FidmarkResult<ImageView<'_, u8>> {
        let normalized = normalize_min_max(self.crop.view())?;
        let mut filtered = open(normalized.view(), params.kernel_size, params.iterations)?;
        if params.use_threshold {
            let on_value = filtered.view().max_value();
            filtered = adaptive_mean_threshold(filtered.view(), params.block_size, on_value)?;
        }
        self.state = MarkState::Filtered { filtered };
        self.filtered()
            .ok_or(FidmarkError::InvalidInput("filtered raster missing"))
    }

    /// Runs the corner detector over the filtered raster.
    ///
    /// A detector miss is returned as [`FidmarkError::NoCornerFound`] and also
    /// recorded in the mark's state.
    pub fn locate_corner(&mut self, params: &CornerParams) -> FidmarkResult<Point> {
        let state = std::mem::replace(&mut self.state, MarkState::Cropped);
        let filtered = match state {
            MarkState::Cropped => {
                return Err(FidmarkError::InvalidInput(
                    "fiducial mark must be filtered before corner detection",
                ))
            }
            MarkState::Filtered { filtered }
            | MarkState::Located { filtered, .. }
            | MarkState::Failed { filtered, .. } => filtered,
        };

        match strongest_corner(filtered.view(), params) {
            Ok(corner) => {
                self.state = MarkState::Located {
                    filtered,
                    corner: corner.position,
                };
                Ok(corner.position)
            }
            Err(error) => {
                self.state = MarkState::Failed {
                    filtered,
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Filters the crop and locates its corner, returning image coordinates.
    pub fn process(
        &mut self,
        filter: &FilterParams,
        corner: &CornerParams,
    ) -> FidmarkResult<Point> {
        let _span = trace_span!(
            "fiducial_mark",
            row = self.offset.row,
            col = self.offset.col
        )
        .entered();
        self.filter(filter)?;
        self.locate_corner(corner)?;
        let point = self.image_coordinates()?;
        trace_event!("fiducial_corner", x = point.x, y = point.y);
        Ok(point)
    }

    /// The detected corner in parent-photo coordinates.
    ///
    /// Local `x` is a crop column and local `y` a crop row, so the result is
    /// `(offset.col + x, offset.row + y)`.
    pub fn image_coordinates(&self) -> FidmarkResult<Point> {
        self.local_corner()
            .map(|corner| corner.offset_by(self.offset))
            .ok_or(FidmarkError::CoordinateNotAvailable)
    }
}
