//! Polygon regions over a scanned photo.
//!
//! A [`RegionCollection`] borrows the photo it annotates and owns an ordered
//! list of polygons in that photo's plot coordinates. Collections rasterize to
//! masks, filter by simple shape attributes, and collapse: the polygons are
//! painted, nearby regions are merged by a morphological opening of the
//! background, and the result is traced back into one outline per merged
//! component.

mod filter;

pub use filter::RegionFilter;

use crate::fiducial::{crop_rects, CropSize};
use crate::geom::{Point, Polygon};
use crate::image::{ImageView, OwnedImage};
use crate::raster::{fill_polygon, open, outer_contours, Connectivity};
use crate::trace::{trace_event, trace_span};
use crate::util::{FidmarkError, FidmarkResult};

/// Sample values used when painting a mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskValues {
    pub background: u8,
    pub foreground: u8,
}

impl Default for MaskValues {
    fn default() -> Self {
        Self {
            background: 255,
            foreground: 0,
        }
    }
}

/// Parameters of [`RegionCollection::collapse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollapseConfig {
    /// Side of the square structuring element.
    pub kernel_size: usize,
    /// Erosion/dilation passes of the opening.
    pub iterations: usize,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            iterations: 3,
        }
    }
}

/// Ordered polygons annotating one source photo.
#[derive(Clone, Debug)]
pub struct RegionCollection<'a> {
    source: ImageView<'a, u8>,
    polygons: Vec<Polygon>,
}

impl<'a> RegionCollection<'a> {
    pub fn new(source: ImageView<'a, u8>, polygons: Vec<Polygon>) -> Self {
        Self { source, polygons }
    }

    /// Builds a collection from rings of `(x, y)` vertices.
    pub fn from_coords<I, R>(source: ImageView<'a, u8>, rings: I) -> FidmarkResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (f64, f64)>,
    {
        let polygons = rings
            .into_iter()
            .map(Polygon::from_xy)
            .collect::<FidmarkResult<Vec<_>>>()?;
        Ok(Self::new(source, polygons))
    }

    /// The four fiducial crop rectangles as polygons (top, right, bottom, left).
    pub fn fiducial_regions(source: ImageView<'a, u8>, size: CropSize) -> FidmarkResult<Self> {
        let polygons = crop_rects(source.width(), source.height(), size)?
            .iter()
            .map(|rect| rect.to_polygon())
            .collect::<FidmarkResult<Vec<_>>>()?;
        Ok(Self::new(source, polygons))
    }

    /// A single ring covering a `width`-pixel frame along the photo border.
    ///
    /// The ring walks the outer boundary, steps to the inner boundary and
    /// walks it in the opposite direction; under the even-odd rule the bridge
    /// edges cancel and only the frame is inside.
    pub fn border_frame(source: ImageView<'a, u8>, width: usize) -> FidmarkResult<Self> {
        let (w, h) = (source.width(), source.height());
        if width == 0 || 2 * width >= w || 2 * width >= h {
            return Err(FidmarkError::InvalidInput(
                "border width must be positive and leave an interior",
            ));
        }
        let (w, h, b) = (w as f64, h as f64, width as f64);
        let ring = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
            Point::new(0.0, 0.0),
            Point::new(b, b),
            Point::new(b, h - b),
            Point::new(w - b, h - b),
            Point::new(w - b, b),
            Point::new(b, b),
        ])?;
        Ok(Self::new(source, vec![ring]))
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn get(&self, index: usize) -> Option<&Polygon> {
        self.polygons.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    pub fn source(&self) -> ImageView<'a, u8> {
        self.source
    }

    /// Concatenates two collections over the same photo, `self` first.
    pub fn combine(&self, other: &RegionCollection<'_>) -> FidmarkResult<RegionCollection<'a>> {
        if !self.source.same_source(&other.source) {
            return Err(FidmarkError::IncompatibleSource);
        }
        let mut polygons = Vec::with_capacity(self.len() + other.len());
        polygons.extend_from_slice(&self.polygons);
        polygons.extend_from_slice(&other.polygons);
        Ok(Self::new(self.source, polygons))
    }

    /// Paints the polygons over a `background` raster the size of the photo.
    ///
    /// Polygons are painted in order, so later ones win where they overlap.
    pub fn generate_mask(&self, background: u8, foreground: u8) -> FidmarkResult<OwnedImage> {
        let mut mask = OwnedImage::filled(self.source.width(), self.source.height(), background)?;
        for polygon in &self.polygons {
            fill_polygon(&mut mask, polygon, foreground);
        }
        Ok(mask)
    }

    /// [`RegionCollection::generate_mask`] with [`MaskValues::default`].
    pub fn generate_default_mask(&self) -> FidmarkResult<OwnedImage> {
        let values = MaskValues::default();
        self.generate_mask(values.background, values.foreground)
    }

    /// Keeps only the polygons accepted by `filter`, in their original order.
    ///
    /// On error the collection is left unchanged.
    pub fn filter(&mut self, filter: &RegionFilter) -> FidmarkResult<()> {
        let _span = trace_span!("region_filter", before = self.polygons.len()).entered();
        let frame_width = self.source.width() as f64;
        let frame_height = self.source.height() as f64;

        let mut kept = Vec::with_capacity(self.polygons.len());
        for polygon in &self.polygons {
            if filter.accepts(polygon, frame_width, frame_height)? {
                kept.push(polygon.clone());
            }
        }
        self.polygons = kept;

        trace_event!("region_filter_kept", count = self.polygons.len());
        Ok(())
    }

    /// Merges nearby regions and replaces the polygons with traced outlines.
    ///
    /// Gaps between regions narrower than the structuring element close up,
    /// interior holes are filled, and each merged component becomes one
    /// polygon. Outlines are ordered by each component's first pixel in
    /// raster order.
    pub fn collapse(&mut self, config: &CollapseConfig) -> FidmarkResult<()> {
        let _span = trace_span!(
            "region_collapse",
            before = self.polygons.len(),
            kernel_size = config.kernel_size,
            iterations = config.iterations
        )
        .entered();

        let values = MaskValues::default();
        let mask = self.generate_mask(values.background, values.foreground)?;
        let opened = open(mask.view(), config.kernel_size, config.iterations)?;
        self.polygons = outer_contours(opened.view(), values.background, Connectivity::Eight)?;

        trace_event!("region_collapse_done", count = self.polygons.len());
        Ok(())
    }
}

impl<'c, 'a> IntoIterator for &'c RegionCollection<'a> {
    type Item = &'c Polygon;
    type IntoIter = std::slice::Iter<'c, Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}
