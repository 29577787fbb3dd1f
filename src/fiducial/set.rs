use super::{FiducialMark, FilterParams};
use crate::corner::CornerParams;
use crate::geom::{PixelRect, Point};
use crate::image::{ImageView, OwnedImage};
use crate::trace::{trace_span, trace_warn};
use crate::util::{FidmarkError, FidmarkResult};

/// Position of a fiducial mark along the photo border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All sides in slot order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }
}

/// Size of every fiducial crop in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CropSize {
    /// Rows.
    pub height: usize,
    /// Columns.
    pub width: usize,
}

impl CropSize {
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }
}

/// Configuration for [`FiducialSet::locate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocateConfig {
    /// Opening element size; `None` derives `height / 200` (at least 1) from the photo.
    pub kernel_size: Option<usize>,
    pub iterations: usize,
    pub use_threshold: bool,
    pub block_size: usize,
    pub corner: CornerParams,
    /// Process the four marks on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            kernel_size: None,
            iterations: 4,
            use_threshold: false,
            block_size: 999,
            corner: CornerParams::default(),
            parallel: false,
        }
    }
}

impl LocateConfig {
    /// Resolves the per-mark filter parameters for a photo `image_height` rows tall.
    pub fn filter_params(&self, image_height: usize) -> FidmarkResult<FilterParams> {
        let kernel_size = self.kernel_size.unwrap_or((image_height / 200).max(1));
        if kernel_size == 0 {
            return Err(FidmarkError::InvalidInput("kernel_size must be at least 1"));
        }
        if self.use_threshold && (self.block_size < 3 || self.block_size % 2 == 0) {
            return Err(FidmarkError::InvalidInput(
                "block_size must be odd and greater than 1",
            ));
        }
        self.corner.validate()?;
        Ok(FilterParams {
            kernel_size,
            iterations: self.iterations,
            use_threshold: self.use_threshold,
            block_size: self.block_size,
        })
    }
}

/// Computes the four fiducial crop rectangles of a `width x height` photo.
///
/// Rectangles are returned in [`Side::ALL`] order. Each one is flush with its
/// border and centered along it; every crop has exactly `size` pixels.
pub fn crop_rects(width: usize, height: usize, size: CropSize) -> FidmarkResult<[PixelRect; 4]> {
    let (h, w) = (size.height, size.width);
    if h == 0 || w == 0 {
        return Err(FidmarkError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    if h > height || w > width {
        return Err(FidmarkError::RoiOutOfBounds {
            x: 0,
            y: 0,
            width: w,
            height: h,
            img_width: width,
            img_height: height,
        });
    }

    let col_start = width / 2 - w / 2;
    let row_start = height / 2 - h / 2;
    let cols = (col_start, col_start + w);
    let rows = (row_start, row_start + h);

    Ok([
        PixelRect::new(0, h, cols.0, cols.1),
        PixelRect::new(rows.0, rows.1, width - w, width),
        PixelRect::new(height - h, height, cols.0, cols.1),
        PixelRect::new(rows.0, rows.1, 0, w),
    ])
}

/// The four fiducial marks of one photo.
#[derive(Clone, Debug)]
pub struct FiducialSet<'a> {
    source: ImageView<'a, u8>,
    marks: [Option<FiducialMark>; 4],
}

impl<'a> FiducialSet<'a> {
    /// Creates a set with no crops yet; every slot reports absent.
    pub fn new(source: ImageView<'a, u8>) -> Self {
        Self {
            source,
            marks: Default::default(),
        }
    }

    pub fn source(&self) -> ImageView<'a, u8> {
        self.source
    }

    /// Crop rectangles of this photo for `size`, in [`Side::ALL`] order.
    pub fn crop_rects(&self, size: CropSize) -> FidmarkResult<[PixelRect; 4]> {
        crop_rects(self.source.width(), self.source.height(), size)
    }

    /// Crops the four marks and locates one corner in each.
    ///
    /// A mark that fails to produce a corner leaves its slot absent; its error
    /// stays available through [`FiducialSet::failures`] and does not affect
    /// the other marks. Invalid parameters or crop geometry fail the whole call
    /// before any mark is replaced.
    pub fn locate(
        &mut self,
        size: CropSize,
        config: &LocateConfig,
    ) -> FidmarkResult<[Option<Point>; 4]> {
        let _span = trace_span!(
            "fiducial_locate",
            width = self.source.width(),
            height = self.source.height(),
            parallel = config.parallel
        )
        .entered();

        let filter = config.filter_params(self.source.height())?;
        let rects = self.crop_rects(size)?;
        let mut marks = rects
            .iter()
            .map(|rect| {
                let crop = OwnedImage::from_view(self.source.crop(*rect)?)?;
                Ok(FiducialMark::new(crop, rect.origin()))
            })
            .collect::<FidmarkResult<Vec<_>>>()?;

        let results = process_marks(&mut marks, &filter, &config.corner, config.parallel);
        for ((side, mark), result) in Side::ALL.iter().zip(&marks).zip(results) {
            if let Err(err) = result {
                // Only detection errors are recorded per mark; anything else is a
                // configuration problem.
                if mark.error().is_none() {
                    return Err(err);
                }
                trace_warn!(
                    "fiducial_failed",
                    side = side.index(),
                    error = err.to_string().as_str()
                );
            }
        }

        let mut slots: [Option<FiducialMark>; 4] = Default::default();
        for (slot, mark) in slots.iter_mut().zip(marks) {
            *slot = Some(mark);
        }
        self.marks = slots;
        Ok(self.coordinates())
    }

    /// Image coordinates of the four corners; absent slots are `None`.
    pub fn coordinates(&self) -> [Option<Point>; 4] {
        Side::ALL.map(|side| {
            self.mark(side)
                .and_then(|mark| mark.image_coordinates().ok())
        })
    }

    /// Marks whose corner detection failed, with their errors.
    pub fn failures(&self) -> Vec<(Side, &FidmarkError)> {
        Side::ALL
            .iter()
            .filter_map(|&side| {
                self.mark(side)
                    .and_then(|mark| mark.error())
                    .map(|err| (side, err))
            })
            .collect()
    }

    pub fn mark(&self, side: Side) -> Option<&FiducialMark> {
        self.marks[side.index()].as_ref()
    }

    pub fn top(&self) -> Option<&FiducialMark> {
        self.mark(Side::Top)
    }

    pub fn right(&self) -> Option<&FiducialMark> {
        self.mark(Side::Right)
    }

    pub fn bottom(&self) -> Option<&FiducialMark> {
        self.mark(Side::Bottom)
    }

    pub fn left(&self) -> Option<&FiducialMark> {
        self.mark(Side::Left)
    }
}

#[cfg(feature = "rayon")]
fn process_marks(
    marks: &mut [FiducialMark],
    filter: &FilterParams,
    corner: &CornerParams,
    parallel: bool,
) -> Vec<FidmarkResult<Point>> {
    use rayon::prelude::*;

    if parallel {
        marks
            .par_iter_mut()
            .map(|mark| mark.process(filter, corner))
            .collect()
    } else {
        marks
            .iter_mut()
            .map(|mark| mark.process(filter, corner))
            .collect()
    }
}

#[cfg(not(feature = "rayon"))]
fn process_marks(
    marks: &mut [FiducialMark],
    filter: &FilterParams,
    corner: &CornerParams,
    _parallel: bool,
) -> Vec<FidmarkResult<Point>> {
    marks
        .iter_mut()
        .map(|mark| mark.process(filter, corner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{crop_rects, CropSize, FiducialSet, LocateConfig, Side};
    use crate::geom::PixelRect;
    use crate::image::ImageView;
    use crate::util::FidmarkError;

    #[test]
    fn crop_rects_are_centered_and_flush() {
        let rects = crop_rects(4000, 3000, CropSize::new(200, 200)).unwrap();
        assert_eq!(rects[0], PixelRect::new(0, 200, 1900, 2100));
        assert_eq!(rects[1], PixelRect::new(1400, 1600, 3800, 4000));
        assert_eq!(rects[2], PixelRect::new(2800, 3000, 1900, 2100));
        assert_eq!(rects[3], PixelRect::new(1400, 1600, 0, 200));
    }

    #[test]
    fn odd_sizes_keep_exact_extent() {
        let rects = crop_rects(101, 51, CropSize::new(7, 9)).unwrap();
        for rect in rects {
            assert_eq!((rect.height(), rect.width()), (7, 9));
        }
        assert_eq!(rects[0].left, 50 - 4);
        assert_eq!(rects[1].top, 25 - 3);
    }

    #[test]
    fn oversized_crop_is_rejected() {
        let err = crop_rects(100, 50, CropSize::new(60, 10)).unwrap_err();
        assert!(matches!(err, FidmarkError::RoiOutOfBounds { .. }));
    }

    #[test]
    fn fresh_set_reports_absent_slots() {
        let data = vec![0u8; 64 * 48];
        let view = ImageView::from_slice(&data, 64, 48).unwrap();
        let set = FiducialSet::new(view);
        assert_eq!(set.coordinates(), [None; 4]);
        assert!(set.failures().is_empty());
        assert!(set.mark(Side::Left).is_none());
    }

    #[test]
    fn locate_fills_every_slot_in_side_order() {
        let data = vec![0u8; 64 * 48];
        let view = ImageView::from_slice(&data, 64, 48).unwrap();
        let mut set = FiducialSet::new(view);
        let size = CropSize::new(10, 12);
        let coords = set.locate(size, &LocateConfig::default()).unwrap();
        assert_eq!(coords, [None; 4]);

        let rects = set.crop_rects(size).unwrap();
        for side in Side::ALL {
            let mark = set.mark(side).unwrap();
            assert_eq!(mark.offset(), rects[side.index()].origin());
            assert!(mark.error().is_some());
        }
        assert_eq!(set.failures().len(), 4);
    }

    #[test]
    fn default_kernel_scales_with_height() {
        let config = LocateConfig::default();
        assert_eq!(config.filter_params(3000).unwrap().kernel_size, 15);
        assert_eq!(config.filter_params(150).unwrap().kernel_size, 1);
        let bad = LocateConfig {
            use_threshold: true,
            block_size: 4,
            ..LocateConfig::default()
        };
        assert!(bad.filter_params(3000).is_err());
    }
}
