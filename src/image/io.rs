//! Convenience helpers for loading photos and saving masks via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::region::{MaskValues, RegionCollection};
use crate::util::{FidmarkError, FidmarkResult};
use std::path::{Path, PathBuf};

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> FidmarkResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> FidmarkResult<OwnedImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    OwnedImage::new(img.as_raw().clone(), width, height)
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> FidmarkResult<OwnedImage> {
    let img = image::open(path).map_err(|err| FidmarkError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}

/// Writes a grayscale image; the format follows the path extension.
pub fn save_gray_image<P: AsRef<Path>>(img: &OwnedImage, path: P) -> FidmarkResult<()> {
    let width = u32::try_from(img.width()).map_err(|_| FidmarkError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let height = u32::try_from(img.height()).map_err(|_| FidmarkError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let buffer = image::GrayImage::from_raw(width, height, img.data().to_vec()).ok_or(
        FidmarkError::BufferTooSmall {
            needed: img.width() * img.height(),
            got: img.data().len(),
        },
    )?;
    buffer.save(path).map_err(|err| FidmarkError::ImageIo {
        reason: err.to_string(),
    })
}

/// Rasterizes a collection with [`RegionCollection::generate_mask`] and saves it.
pub fn save_mask<P: AsRef<Path>>(
    regions: &RegionCollection<'_>,
    path: P,
    values: MaskValues,
) -> FidmarkResult<()> {
    let mask = regions.generate_mask(values.background, values.foreground)?;
    save_gray_image(&mask, path)
}

/// Inserts `suffix` between the file stem and the extension.
///
/// `scans/photo_01.tif` with `_mask` becomes `scans/photo_01_mask.tif`.
pub fn add_suffix<P: AsRef<Path>>(path: P, suffix: &str) -> PathBuf {
    let path = path.as_ref();
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::{add_suffix, owned_from_gray_image, view_from_gray_image};
    use std::path::PathBuf;

    #[test]
    fn gray_image_views_share_layout() {
        let img = image::GrayImage::from_fn(5, 3, |x, y| image::Luma([(y * 5 + x) as u8]));
        let view = view_from_gray_image(&img).unwrap();
        assert_eq!((view.width(), view.height()), (5, 3));
        assert_eq!(view.get(4, 2), Some(&14));
        assert_eq!(view.min_max(), (0, 14));

        let owned = owned_from_gray_image(&img).unwrap();
        assert_eq!(owned.view().get(1, 1), view.get(1, 1));
    }

    #[test]
    fn add_suffix_keeps_directory_and_extension() {
        assert_eq!(
            add_suffix("scans/photo_01.tif", "_mask"),
            PathBuf::from("scans/photo_01_mask.tif")
        );
        assert_eq!(add_suffix("photo", "_mask"), PathBuf::from("photo_mask"));
    }
}
