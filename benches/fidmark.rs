use criterion::{criterion_group, criterion_main, Criterion};
use fidmark::fiducial::crop_rects;
use fidmark::lowlevel::{open, outer_contours, Connectivity};
use fidmark::{
    CollapseConfig, CropSize, FiducialSet, ImageView, LocateConfig, RegionCollection,
};
use std::hint::black_box;

fn make_photo(width: usize, height: usize, size: CropSize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0x3F;
            data.push(value as u8);
        }
    }
    for rect in crop_rects(width, height, size).unwrap() {
        for y in rect.top + size.height / 3..rect.bottom {
            for x in rect.left + size.width / 3..rect.right {
                data[y * width + x] = 230;
            }
        }
    }
    data
}

fn grid_rings(cols: usize, rows: usize, side: f64, gap: f64) -> Vec<Vec<(f64, f64)>> {
    let mut rings = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let x0 = 20.0 + c as f64 * (side + gap);
            let y0 = 20.0 + r as f64 * (side + gap);
            rings.push(vec![
                (x0, y0),
                (x0 + side, y0),
                (x0 + side, y0 + side),
                (x0, y0 + side),
            ]);
        }
    }
    rings
}

fn bench_locate(c: &mut Criterion) {
    let (width, height) = (1600, 1200);
    let size = CropSize::new(160, 160);
    let photo = make_photo(width, height, size);
    let view = ImageView::from_slice(&photo, width, height).unwrap();

    c.bench_function("fiducial_locate", |b| {
        b.iter(|| {
            let mut set = FiducialSet::new(view);
            black_box(set.locate(size, &LocateConfig::default()).unwrap())
        });
    });

    if cfg!(feature = "rayon") {
        let config = LocateConfig {
            parallel: true,
            ..LocateConfig::default()
        };
        c.bench_function("fiducial_locate_parallel", |b| {
            b.iter(|| {
                let mut set = FiducialSet::new(view);
                black_box(set.locate(size, &config).unwrap())
            });
        });
    }
}

fn bench_regions(c: &mut Criterion) {
    let (width, height) = (1024, 768);
    let photo = vec![0u8; width * height];
    let source = ImageView::from_slice(&photo, width, height).unwrap();
    let rings = grid_rings(12, 9, 60.0, 3.0);
    let regions = RegionCollection::from_coords(source, rings).unwrap();

    c.bench_function("region_generate_mask", |b| {
        b.iter(|| black_box(regions.generate_default_mask().unwrap()));
    });

    c.bench_function("region_collapse", |b| {
        b.iter(|| {
            let mut merged = regions.clone();
            merged.collapse(&CollapseConfig::default()).unwrap();
            black_box(merged.len())
        });
    });

    let mask = regions.generate_default_mask().unwrap();
    c.bench_function("morph_open_5x5_x3", |b| {
        b.iter(|| black_box(open(mask.view(), 5, 3).unwrap()));
    });
    c.bench_function("outer_contours", |b| {
        b.iter(|| black_box(outer_contours(mask.view(), 255, Connectivity::Eight).unwrap()));
    });
}

criterion_group!(benches, bench_locate, bench_regions);
criterion_main!(benches);
