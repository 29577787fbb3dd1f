use fidmark::fiducial::crop_rects;
use fidmark::{
    CropSize, FidmarkError, FiducialSet, ImageView, LocateConfig, PixelRect, Point, Side,
};

const WIDTH: usize = 800;
const HEIGHT: usize = 600;
const CROP: CropSize = CropSize::new(120, 120);
/// Crop-local position of the synthetic mark corner.
const CORNER: usize = 40;

/// Dark photo whose four crops each hold a bright block with its top-left
/// corner at `(CORNER, CORNER)` inside the crop.
fn synthetic_photo() -> Vec<u8> {
    let mut data = vec![30u8; WIDTH * HEIGHT];
    for rect in crop_rects(WIDTH, HEIGHT, CROP).unwrap() {
        for y in rect.top + CORNER..rect.bottom {
            for x in rect.left + CORNER..rect.right {
                data[y * WIDTH + x] = 200;
            }
        }
    }
    data
}

fn expected_corners() -> [Point; 4] {
    crop_rects(WIDTH, HEIGHT, CROP)
        .unwrap()
        .map(|rect| Point::new((rect.left + CORNER) as f64, (rect.top + CORNER) as f64))
}

#[test]
fn crop_rects_for_a_4000_by_3000_photo() {
    let data = vec![0u8; 4000 * 3000];
    let view = ImageView::from_slice(&data, 4000, 3000).unwrap();
    let set = FiducialSet::new(view);
    let rects = set.crop_rects(CropSize::new(200, 200)).unwrap();
    assert_eq!(rects[Side::Top.index()], PixelRect::new(0, 200, 1900, 2100));
    assert_eq!(rects[Side::Bottom.index()], PixelRect::new(2800, 3000, 1900, 2100));
    assert_eq!(rects[Side::Right.index()], PixelRect::new(1400, 1600, 3800, 4000));
    assert_eq!(rects[Side::Left.index()], PixelRect::new(1400, 1600, 0, 200));
}

#[test]
fn locates_all_four_corners() {
    let data = synthetic_photo();
    let view = ImageView::from_slice(&data, WIDTH, HEIGHT).unwrap();
    let mut set = FiducialSet::new(view);

    let coords = set.locate(CROP, &LocateConfig::default()).unwrap();
    for (found, expected) in coords.iter().zip(expected_corners()) {
        let found = found.expect("corner located");
        assert!(
            found.distance(expected) <= 1.5,
            "found {found:?}, expected {expected:?}"
        );
    }
    assert!(set.failures().is_empty());
    assert_eq!(set.coordinates(), coords);

    let top = set.top().unwrap();
    assert_eq!(top.offset().col, WIDTH / 2 - CROP.width / 2);
    assert_eq!(top.crop().width(), CROP.width);
    assert_eq!(top.filtered().unwrap().min_max(), (0, 255));
}

#[test]
fn blank_photo_reports_per_slot_failures() {
    let data = vec![0u8; WIDTH * HEIGHT];
    let view = ImageView::from_slice(&data, WIDTH, HEIGHT).unwrap();
    let mut set = FiducialSet::new(view);

    let coords = set.locate(CROP, &LocateConfig::default()).unwrap();
    assert_eq!(coords, [None; 4]);
    let failures = set.failures();
    assert_eq!(failures.len(), 4);
    assert_eq!(
        failures.iter().map(|(side, _)| *side).collect::<Vec<_>>(),
        Side::ALL.to_vec()
    );
    assert!(failures
        .iter()
        .all(|(_, err)| **err == FidmarkError::NoCornerFound));
    assert_eq!(
        set.left().unwrap().image_coordinates().unwrap_err(),
        FidmarkError::CoordinateNotAvailable
    );
}

#[test]
fn one_blank_crop_does_not_block_the_others() {
    let mut data = synthetic_photo();
    let right = crop_rects(WIDTH, HEIGHT, CROP).unwrap()[Side::Right.index()];
    for y in right.top..right.bottom {
        for x in right.left..right.right {
            data[y * WIDTH + x] = 30;
        }
    }
    let view = ImageView::from_slice(&data, WIDTH, HEIGHT).unwrap();
    let mut set = FiducialSet::new(view);

    let coords = set.locate(CROP, &LocateConfig::default()).unwrap();
    assert!(coords[Side::Right.index()].is_none());
    assert!(coords[Side::Top.index()].is_some());
    assert!(coords[Side::Bottom.index()].is_some());
    assert!(coords[Side::Left.index()].is_some());
    assert_eq!(set.failures().len(), 1);
    assert_eq!(set.failures()[0].0, Side::Right);
}

#[test]
fn threshold_path_binarizes_and_locates() {
    let data = synthetic_photo();
    let view = ImageView::from_slice(&data, WIDTH, HEIGHT).unwrap();
    let mut set = FiducialSet::new(view);
    let config = LocateConfig {
        use_threshold: true,
        block_size: 31,
        ..LocateConfig::default()
    };
    let coords = set.locate(CROP, &config).unwrap();
    assert!(coords.iter().all(Option::is_some));
    for side in Side::ALL {
        let filtered = set.mark(side).unwrap().filtered().unwrap();
        assert!(filtered
            .rows()
            .flatten()
            .all(|&v| v == 0 || v == 255));
    }
}

#[test]
fn invalid_geometry_fails_the_whole_call() {
    let data = synthetic_photo();
    let view = ImageView::from_slice(&data, WIDTH, HEIGHT).unwrap();
    let mut set = FiducialSet::new(view);

    let err = set.locate(CropSize::new(700, 100), &LocateConfig::default());
    assert!(matches!(err, Err(FidmarkError::RoiOutOfBounds { .. })));

    let bad = LocateConfig {
        kernel_size: Some(0),
        ..LocateConfig::default()
    };
    assert!(matches!(
        set.locate(CROP, &bad),
        Err(FidmarkError::InvalidInput(_))
    ));
    assert_eq!(set.coordinates(), [None; 4]);
}
