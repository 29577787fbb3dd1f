//! Grayscale morphology with square structuring elements.
//!
//! The element is anchored at `size / 2`, so the window of pixel `x` spans
//! `[x - size/2, x - size/2 + size)`. Samples outside the raster are ignored
//! (they never win a min or max). A square element is separable, so each
//! pass runs a 1D van Herk/Gil-Werman filter over rows and then columns at a
//! constant cost per pixel regardless of `size`.

use crate::image::{ImageView, OwnedImage};
use crate::util::{FidmarkError, FidmarkResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MorphOp {
    Erode,
    Dilate,
}

impl MorphOp {
    fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            MorphOp::Erode => a.min(b),
            MorphOp::Dilate => a.max(b),
        }
    }

    /// Value that never changes the result; stands in for off-raster samples.
    fn identity(self) -> u8 {
        match self {
            MorphOp::Erode => u8::MAX,
            MorphOp::Dilate => u8::MIN,
        }
    }
}

/// Scratch buffers reused across rows and columns.
struct LineFilter {
    size: usize,
    op: MorphOp,
    padded: Vec<u8>,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
}

impl LineFilter {
    fn new(size: usize, op: MorphOp) -> Self {
        Self {
            size,
            op,
            padded: Vec::new(),
            prefix: Vec::new(),
            suffix: Vec::new(),
        }
    }

    fn run(&mut self, src: &[u8], dst: &mut [u8]) {
        let n = src.len();
        let size = self.size;
        let anchor = size / 2;
        let op = self.op;
        let m = n + size - 1;

        self.padded.clear();
        self.padded.resize(m, op.identity());
        self.padded[anchor..anchor + n].copy_from_slice(src);

        self.prefix.resize(m, 0);
        self.suffix.resize(m, 0);
        for t in 0..m {
            self.prefix[t] = if t % size == 0 {
                self.padded[t]
            } else {
                op.apply(self.prefix[t - 1], self.padded[t])
            };
        }
        for t in (0..m).rev() {
            self.suffix[t] = if t == m - 1 || (t + 1) % size == 0 {
                self.padded[t]
            } else {
                op.apply(self.suffix[t + 1], self.padded[t])
            };
        }

        for (i, out) in dst.iter_mut().enumerate().take(n) {
            *out = op.apply(self.suffix[i], self.prefix[i + size - 1]);
        }
    }
}

fn check_kernel(size: usize) -> FidmarkResult<()> {
    if size == 0 {
        return Err(FidmarkError::InvalidInput("kernel size must be at least 1"));
    }
    Ok(())
}

fn apply_once(src: &OwnedImage, size: usize, op: MorphOp) -> FidmarkResult<OwnedImage> {
    let width = src.width();
    let height = src.height();
    let mut line = LineFilter::new(size, op);

    let mut horizontal = OwnedImage::filled(width, height, 0)?;
    for (src_row, dst_row) in src
        .data()
        .chunks_exact(width)
        .zip(horizontal.data_mut().chunks_exact_mut(width))
    {
        line.run(src_row, dst_row);
    }

    let mut out = OwnedImage::filled(width, height, 0)?;
    let mut column = vec![0u8; height];
    let mut filtered = vec![0u8; height];
    for x in 0..width {
        for (y, value) in column.iter_mut().enumerate() {
            *value = horizontal.data()[y * width + x];
        }
        line.run(&column, &mut filtered);
        let data = out.data_mut();
        for (y, &value) in filtered.iter().enumerate() {
            data[y * width + x] = value;
        }
    }
    Ok(out)
}

fn apply_repeated(
    src: ImageView<'_, u8>,
    size: usize,
    iterations: usize,
    op: MorphOp,
) -> FidmarkResult<OwnedImage> {
    check_kernel(size)?;
    let mut img = OwnedImage::from_view(src)?;
    if size == 1 {
        return Ok(img);
    }
    for _ in 0..iterations {
        img = apply_once(&img, size, op)?;
    }
    Ok(img)
}

/// Minimum filter over a `size x size` window, repeated `iterations` times.
pub fn erode(src: ImageView<'_, u8>, size: usize, iterations: usize) -> FidmarkResult<OwnedImage> {
    apply_repeated(src, size, iterations, MorphOp::Erode)
}

/// Maximum filter over a `size x size` window, repeated `iterations` times.
pub fn dilate(
    src: ImageView<'_, u8>,
    size: usize,
    iterations: usize,
) -> FidmarkResult<OwnedImage> {
    apply_repeated(src, size, iterations, MorphOp::Dilate)
}

/// Morphological opening: `iterations` erosions followed by as many dilations.
///
/// Removes bright structures narrower than the element and, equivalently,
/// closes dark gaps narrower than it.
pub fn open(src: ImageView<'_, u8>, size: usize, iterations: usize) -> FidmarkResult<OwnedImage> {
    let eroded = erode(src, size, iterations)?;
    dilate(eroded.view(), size, iterations)
}

#[cfg(test)]
mod tests {
    use super::{dilate, erode, open};
    use crate::image::OwnedImage;

    fn naive(src: &OwnedImage, size: usize, erode: bool) -> Vec<u8> {
        let (w, h) = (src.width() as isize, src.height() as isize);
        let anchor = (size / 2) as isize;
        let mut out = Vec::with_capacity(src.data().len());
        for y in 0..h {
            for x in 0..w {
                let mut acc = if erode { u8::MAX } else { u8::MIN };
                for dy in 0..size as isize {
                    for dx in 0..size as isize {
                        let (nx, ny) = (x - anchor + dx, y - anchor + dy);
                        if nx < 0 || ny < 0 || nx >= w || ny >= h {
                            continue;
                        }
                        let v = src.get(nx as usize, ny as usize).unwrap();
                        acc = if erode { acc.min(v) } else { acc.max(v) };
                    }
                }
                out.push(acc);
            }
        }
        out
    }

    fn pattern(width: usize, height: usize) -> OwnedImage {
        let data = (0..width * height)
            .map(|i| ((i * 37) ^ (i / 7 * 11)) as u8)
            .collect();
        OwnedImage::new(data, width, height).unwrap()
    }

    #[test]
    fn separable_filter_matches_naive_window() {
        let img = pattern(13, 9);
        for size in [2, 3, 4, 5, 7] {
            let eroded = erode(img.view(), size, 1).unwrap();
            assert_eq!(eroded.data(), naive(&img, size, true).as_slice(), "size {size}");
            let dilated = dilate(img.view(), size, 1).unwrap();
            assert_eq!(dilated.data(), naive(&img, size, false).as_slice(), "size {size}");
        }
    }

    #[test]
    fn open_removes_small_bright_speck() {
        let mut data = vec![0u8; 81];
        data[40] = 255;
        let img = OwnedImage::new(data, 9, 9).unwrap();
        let out = open(img.view(), 3, 1).unwrap();
        assert!(out.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn zero_kernel_is_rejected() {
        let img = pattern(4, 4);
        assert!(erode(img.view(), 0, 1).is_err());
    }
}
