//! fidmark locates fiducial-mark corners on scanned aerial photographs and
//! manages polygon regions over those photographs.
//!
//! Two pipelines share one set of raster primitives:
//!
//! - [`FiducialSet`] crops the four border marks of a photo, filters each crop
//!   and finds one corner per mark, reporting it in photo coordinates.
//! - [`RegionCollection`] rasterizes polygons into masks, filters them by
//!   shape, and collapses nearby regions through a mask/outline round trip.
//!
//! The four marks can be processed on the rayon pool via the `rayon`
//! feature; `image-io` adds loading and saving helpers, and `tracing` emits
//! spans for the main operations.

mod candidate;
pub mod corner;
pub mod fiducial;
pub mod geom;
pub mod image;
pub mod lowlevel;
pub mod raster;
mod refine;
pub mod region;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use corner::{Corner, CornerParams, CornerResponseKind};
pub use fiducial::{CropSize, FiducialMark, FiducialSet, FilterParams, LocateConfig, Side};
pub use geom::{Extent, PixelIndex, PixelRect, Point, Polygon};
pub use crate::image::{ImageView, OwnedImage};
pub use region::{CollapseConfig, MaskValues, RegionCollection, RegionFilter};
pub use util::{FidmarkError, FidmarkResult};
