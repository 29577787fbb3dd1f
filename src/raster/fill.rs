//! Scanline polygon rasterization.
//!
//! A pixel `(px, py)` is inside when its center `(px + 0.5, py + 0.5)` is
//! inside the polygon under the even-odd rule. Edges therefore behave as
//! half-open intervals: an axis-aligned rectangle with corners `(x0, y0)` and
//! `(x1, y1)` covers exactly `x0 <= px < x1`, `y0 <= py < y1`, and outlines
//! traced on the pixel-corner lattice re-rasterize to their source pixels.

use crate::geom::Polygon;
use crate::image::OwnedImage;

fn first_center_at_or_after(v: f64) -> isize {
    (v - 0.5).ceil() as isize
}

/// Paints every pixel inside `polygon` with `value`; pixels outside the
/// raster are skipped.
pub fn fill_polygon(dst: &mut OwnedImage, polygon: &Polygon, value: u8) {
    let width = dst.width() as isize;
    let height = dst.height() as isize;
    let extent = polygon.extent();

    let row_start = first_center_at_or_after(extent.top).max(0);
    let row_end = first_center_at_or_after(extent.bottom).min(height);

    let mut crossings: Vec<f64> = Vec::with_capacity(polygon.len());
    for py in row_start..row_end {
        let yc = py as f64 + 0.5;
        crossings.clear();
        for (a, b) in polygon.edges() {
            if (a.y <= yc) != (b.y <= yc) {
                crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        crossings.sort_by(f64::total_cmp);

        let Some(row) = dst.row_mut(py as usize) else {
            continue;
        };
        for span in crossings.chunks_exact(2) {
            let start = first_center_at_or_after(span[0]).clamp(0, width) as usize;
            let end = first_center_at_or_after(span[1]).clamp(0, width) as usize;
            if start < end {
                row[start..end].fill(value);
            }
        }
    }
}
