#![cfg(feature = "rayon")]

use fidmark::fiducial::crop_rects;
use fidmark::{CropSize, FiducialSet, ImageView, LocateConfig};

fn make_photo(width: usize, height: usize, size: CropSize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((((x * 7) ^ (y * 3)) & 0x1F) as u8);
        }
    }
    for (i, rect) in crop_rects(width, height, size).unwrap().iter().enumerate() {
        let offset = 20 + 7 * i;
        for y in rect.top + offset..rect.bottom {
            for x in rect.left + offset..rect.right {
                data[y * width + x] = 220;
            }
        }
    }
    data
}

#[test]
fn parallel_locate_matches_sequential() {
    let (width, height) = (640, 480);
    let size = CropSize::new(96, 112);
    let data = make_photo(width, height, size);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    let sequential = LocateConfig::default();
    let parallel = LocateConfig {
        parallel: true,
        ..LocateConfig::default()
    };

    let mut seq_set = FiducialSet::new(view);
    let mut par_set = FiducialSet::new(view);
    let seq = seq_set.locate(size, &sequential).unwrap();
    let par = par_set.locate(size, &parallel).unwrap();

    assert_eq!(seq, par);
    assert!(seq.iter().all(Option::is_some));
    assert_eq!(seq_set.failures().len(), par_set.failures().len());
}
