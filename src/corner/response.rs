//! Structure-tensor corner response maps.

use crate::image::ImageView;
use crate::util::math::reflect101;

/// Scores a 2x2 structure tensor `[[a, b], [b, c]]`.
pub trait CornerMeasure {
    fn score(&self, a: f32, b: f32, c: f32) -> f32;
}

/// Shi-Tomasi measure: the smaller eigenvalue of the tensor.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinEigen;

impl CornerMeasure for MinEigen {
    fn score(&self, a: f32, b: f32, c: f32) -> f32 {
        let half_trace = 0.5 * (a + c);
        let half_diff = 0.5 * (a - c);
        half_trace - (half_diff * half_diff + b * b).sqrt()
    }
}

/// Harris measure `det - k * trace^2`.
#[derive(Clone, Copy, Debug)]
pub struct Harris {
    pub k: f32,
}

impl CornerMeasure for Harris {
    fn score(&self, a: f32, b: f32, c: f32) -> f32 {
        let trace = a + c;
        a * c - b * b - self.k * trace * trace
    }
}

/// Dense per-pixel response values, row-major.
pub struct ResponseMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ResponseMap {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the response at `(x, y)`, or `None` outside the map.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// 3x3 neighborhood centered at an interior pixel, indexed `[row][col]`.
    pub(crate) fn neighborhood(&self, x: usize, y: usize) -> Option<[[f32; 3]; 3]> {
        if x == 0 || y == 0 || x + 1 >= self.width || y + 1 >= self.height {
            return None;
        }
        let mut s = [[0.0f32; 3]; 3];
        for (r, row) in s.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.data[(y + r - 1) * self.width + (x + c - 1)];
            }
        }
        Some(s)
    }
}

/// Computes a corner response for every pixel.
///
/// Gradients come from 3x3 Sobel operators and the tensor entries are summed
/// over a `block_size` window centered on the pixel. Both stages mirror the
/// border with reflect-101. Gradients are scaled by `1 / (4 * block_size * 255)`
/// so responses do not depend on the window size.
pub fn response_map<M: CornerMeasure>(
    src: ImageView<'_, u8>,
    block_size: usize,
    measure: &M,
) -> ResponseMap {
    let width = src.width();
    let height = src.height();
    let at = |x: isize, y: isize| -> f32 {
        let xi = reflect101(x, width);
        let yi = reflect101(y, height);
        src.get(xi, yi).map_or(0.0, |&v| f32::from(v))
    };

    let scale = 1.0 / (4.0 * block_size as f32 * 255.0);
    let mut cov = vec![[0.0f32; 3]; width * height];
    for y in 0..height as isize {
        for x in 0..width as isize {
            let dx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
            let dy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
            let (dx, dy) = (dx * scale, dy * scale);
            cov[y as usize * width + x as usize] = [dx * dx, dx * dy, dy * dy];
        }
    }

    let radius = (block_size / 2) as isize;
    let mut data = vec![0.0f32; width * height];
    for y in 0..height as isize {
        for x in 0..width as isize {
            let mut sum = [0.0f32; 3];
            for by in -radius..=radius {
                let yi = reflect101(y + by, height);
                for bx in -radius..=radius {
                    let xi = reflect101(x + bx, width);
                    let t = cov[yi * width + xi];
                    sum[0] += t[0];
                    sum[1] += t[1];
                    sum[2] += t[2];
                }
            }
            data[y as usize * width + x as usize] = measure.score(sum[0], sum[1], sum[2]);
        }
    }

    ResponseMap {
        width,
        height,
        data,
    }
}
